use miette::{IntoDiagnostic, Result};
use typepatch_core::version::VersionInfo;

pub fn run(json: bool) -> Result<()> {
    let info = VersionInfo::current();
    if json {
        let mut out = serde_json::to_value(&info).into_diagnostic()?;
        if let Some(fields) = out.as_object_mut() {
            fields.insert("ok".to_string(), serde_json::Value::Bool(true));
        }
        println!("{out}");
    } else {
        println!("{info}");
    }
    Ok(())
}
