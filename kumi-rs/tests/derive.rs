use std::collections::HashMap;

use kumi::cli::{
    Binder, CommandModel, CommandModelBuilder, CommandTreeResolver, ConverterRegistry, NodeId,
    PairDeconstructor, ParsingOptions,
};
use kumi::{BindError, CommandSettings, FlagValue, Lookup, ValidationError};

fn model<S: CommandSettings>() -> CommandModel {
    let mut builder = CommandModelBuilder::new(ParsingOptions::default());
    builder.add_command(NodeId::ROOT, "run", S::schema()).unwrap();
    builder.build().unwrap()
}

fn bind<S: CommandSettings>(args: &[&str]) -> Result<S, BindError> {
    let model = model::<S>();
    let mut args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
    args.insert(0, "run".to_string());
    let tree = CommandTreeResolver::new(&model).resolve_args(&args).unwrap();
    let registry = ConverterRegistry::default();
    Binder::new(&model, &registry).bind(tree.leaf().unwrap())
}

#[derive(CommandSettings)]
struct Serve {
    #[kumi(option = "--serve [PORT]")]
    serve: FlagValue<u16>,
}

#[test]
fn test_flag_value() {
    let bare = bind::<Serve>(&["--serve"]).unwrap();
    assert_eq!(bare.serve, FlagValue::set(0));

    let valued = bind::<Serve>(&["--serve", "123"]).unwrap();
    assert_eq!(valued.serve, FlagValue::set(123));

    let unbound = bind::<Serve>(&[]).unwrap();
    assert!(!unbound.serve.is_set);
}

#[derive(CommandSettings)]
struct Vars {
    #[kumi(option = "--var <VALUE>")]
    latest: HashMap<String, u32>,
}

#[derive(CommandSettings)]
struct AllVars {
    #[kumi(option = "--var <VALUE>")]
    all: Lookup<String, u32>,
}

#[test]
fn test_pairs_last_wins_or_all_retained() {
    let args = ["--var", "foo=1", "--var", "foo=3", "--var", "bar=4"];

    let vars = bind::<Vars>(&args).unwrap();
    assert_eq!(vars.latest.len(), 2);
    assert_eq!(vars.latest["foo"], 3);
    assert_eq!(vars.latest["bar"], 4);

    let all = bind::<AllVars>(&args).unwrap();
    assert_eq!(all.all.get(&"foo".to_string()), &[1, 3]);
    assert_eq!(all.all.get(&"bar".to_string()), &[4]);
}

#[derive(Debug)]
struct Colon;

impl PairDeconstructor for Colon {
    fn deconstruct(&self, parameter: &str, value: &str) -> Result<(String, String), BindError> {
        value
            .split_once(':')
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .ok_or_else(|| BindError::PairFormat {
                parameter: parameter.to_string(),
                value: value.to_string(),
            })
    }
}

#[derive(CommandSettings)]
struct Headers {
    #[kumi(option = "-H|--header <HEADER>", pair_deconstructor = Colon)]
    headers: HashMap<String, String>,
}

#[test]
fn test_custom_pair_deconstructor() {
    let headers = bind::<Headers>(&["-H", "accept:json"]).unwrap();
    assert_eq!(headers.headers["accept"], "json");
    assert!(matches!(
        bind::<Headers>(&["-H", "accept=json"]),
        Err(BindError::PairFormat { .. })
    ));
}

#[derive(CommandSettings)]
struct Files {
    #[kumi(argument = "<FILES>", description = "Files to copy")]
    files: Vec<String>,
}

#[test]
fn test_vector_argument_in_input_order() {
    let files = bind::<Files>(&["a", "b", "c"]).unwrap();
    assert_eq!(files.files, vec!["a", "b", "c"]);
}

fn parse_celsius(raw: &str) -> Result<f64, String> {
    raw.strip_suffix('C')
        .unwrap_or(raw)
        .parse()
        .map_err(|_| "not a temperature".to_string())
}

#[derive(CommandSettings)]
#[kumi(validate = Self::check)]
struct Thermostat {
    #[kumi(option = "-t|--target <TEMP>", converter = parse_celsius, default = "20C")]
    target: f64,
    #[kumi(option = "--debug", hidden)]
    debug: bool,
}

impl Thermostat {
    fn check(&self) -> Result<(), ValidationError> {
        if self.target > 30.0 {
            return Err(ValidationError::new("Too hot."));
        }
        Ok(())
    }
}

#[test]
fn test_field_converter_default_and_validation() {
    let t = bind::<Thermostat>(&[]).unwrap();
    assert_eq!(t.target, 20.0);
    assert!(!t.debug);

    let t = bind::<Thermostat>(&["-t", "25.5C", "--debug"]).unwrap();
    assert_eq!(t.target, 25.5);
    assert!(t.debug);

    let err = bind::<Thermostat>(&["-t", "40"]).err().unwrap();
    assert_eq!(err.to_string(), "Too hot.");

    let err = bind::<Thermostat>(&["-t", "warm"]).err().unwrap();
    assert!(err.to_string().contains("not a temperature"));
}

#[test]
fn test_schema_records_descriptions_and_hidden_options() {
    let model = model::<Thermostat>();
    let run = model.find_child(NodeId::ROOT, "run").unwrap();
    let node = model.node(run);
    assert_eq!(node.options.len(), 2);
    assert!(node.options.iter().any(|o| o.is_hidden));
    assert_eq!(node.settings_type, "Thermostat");
}
