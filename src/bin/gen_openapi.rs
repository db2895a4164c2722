use utoipa::OpenApi;
use weeblist::openapi::ApiDoc;

fn main() -> anyhow::Result<()> {
    let yaml = ApiDoc::openapi().to_yaml()?;
    println!("{}", yaml);
    Ok(())
}
