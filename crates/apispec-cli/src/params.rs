//! # Params Subcommand
//!
//! Prints the permit list derived for one action, as JSON.

use anyhow::{Context, Result};
use apispec_api::ApiSpecConfig;
use apispec_contract::{ContractError, ParameterDeriver};
use apispec_core::ActionId;
use apispec_schema::SchemaResolver;
use clap::Args;

/// Arguments for the params subcommand.
#[derive(Args, Debug)]
pub struct ParamsArgs {
    /// Action as `namespace#action`, e.g. `admin/users#create`.
    pub action: ActionId,
}

/// Execute the params subcommand.
pub fn run_params(args: &ParamsArgs, config: &ApiSpecConfig) -> Result<u8> {
    println!("{}", permit_list_json(&args.action, config)?);
    Ok(0)
}

/// The permit list of `id` as compact JSON.
pub fn permit_list_json(id: &ActionId, config: &ApiSpecConfig) -> Result<String> {
    let resolver = SchemaResolver::new(config.store());
    let fragment = resolver
        .resolve(id)
        .with_context(|| format!("failed to load fragment for {id}"))?
        .ok_or_else(|| ContractError::MissingSchema {
            id: id.clone(),
            expected: resolver.store().expected_path(id),
        })?;

    let list = ParameterDeriver::new(&fragment).permit_list();
    serde_json::to_string(&list).context("failed to serialize permit list")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prints_nested_permit_list() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("users")).unwrap();
        std::fs::write(
            dir.path().join("users/_create.schema.yaml"),
            r##"
parameters:
  - name: invite
    in: query
requestBody:
  content:
    application/json:
      schema:
        type: object
        properties:
          name: {type: string}
          address: {$ref: "#/$defs/Address"}
$defs:
  Address:
    type: object
    properties:
      city: {type: string}
"##,
        )
        .unwrap();
        let config = ApiSpecConfig {
            roots: vec![dir.path().to_path_buf()],
            ..ApiSpecConfig::default()
        };

        let json = permit_list_json(&ActionId::parse("users#create").unwrap(), &config).unwrap();
        assert_eq!(json, r#"["name",{"address":["city"]},"invite"]"#);
    }

    #[test]
    fn missing_fragment_names_expected_path() {
        let dir = tempfile::tempdir().unwrap();
        let config = ApiSpecConfig {
            roots: vec![dir.path().to_path_buf()],
            ..ApiSpecConfig::default()
        };
        let err = permit_list_json(&ActionId::parse("users#create").unwrap(), &config).unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("No OpenAPI schema found for users#create."));
        assert!(message.ends_with("_create.schema.json"));
    }
}
