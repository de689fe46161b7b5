use std::collections::HashMap;

use kumi_cli::*;

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug)]
struct ServeSettings {
    serve: FlagValue<i32>,
}

impl CommandSettings for ServeSettings {
    fn declare(schema: &mut SettingsSchema) {
        schema.option::<FlagValue<i32>>("serve", "--serve [PORT]");
    }

    fn bind(values: &mut BoundValues) -> Result<Self, BindError> {
        Ok(Self {
            serve: values.take("serve")?,
        })
    }
}

#[derive(Debug)]
struct VarSettings {
    dictionary: HashMap<String, i32>,
    lookup: Lookup<String, i32>,
}

impl CommandSettings for VarSettings {
    fn declare(schema: &mut SettingsSchema) {
        schema.option::<HashMap<String, i32>>("dictionary", "--var <VAR>");
        schema.option::<Lookup<String, i32>>("lookup", "--multi <VAR>");
    }

    fn bind(values: &mut BoundValues) -> Result<Self, BindError> {
        Ok(Self {
            dictionary: values.take("dictionary")?,
            lookup: values.take("lookup")?,
        })
    }
}

#[derive(Debug)]
struct CopySettings {
    files: Vec<String>,
}

impl CommandSettings for CopySettings {
    fn declare(schema: &mut SettingsSchema) {
        schema.argument::<Vec<String>>("files", "<FILES>");
    }

    fn bind(values: &mut BoundValues) -> Result<Self, BindError> {
        Ok(Self {
            files: values.take("files")?,
        })
    }
}

#[derive(Debug)]
struct AgeSettings {
    age: u8,
}

impl CommandSettings for AgeSettings {
    fn declare(schema: &mut SettingsSchema) {
        schema.argument::<u8>("age", "<AGE>");
    }

    fn bind(values: &mut BoundValues) -> Result<Self, BindError> {
        Ok(Self {
            age: values.take("age")?,
        })
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.age > 30 {
            return Err(ValidationError::new("Dogs do not live that long."));
        }
        Ok(())
    }
}

fn model() -> CommandModel {
    let mut builder = CommandModelBuilder::new(ParsingOptions::default());
    builder.add_command(NodeId::ROOT, "serve", ServeSettings::schema()).unwrap();
    builder.add_command(NodeId::ROOT, "vars", VarSettings::schema()).unwrap();
    builder.add_command(NodeId::ROOT, "copy", CopySettings::schema()).unwrap();
    builder.add_command(NodeId::ROOT, "age", AgeSettings::schema()).unwrap();
    builder.build().unwrap()
}

fn bind<S: CommandSettings>(model: &CommandModel, input: &[&str]) -> Result<S, BindError> {
    let tree = CommandTreeResolver::new(model).resolve_args(&args(input)).unwrap();
    let registry = ConverterRegistry::default();
    let leaf = tree.leaf().unwrap();
    Binder::new(model, &registry).bind(leaf)
}

#[test]
fn test_flag_value_binding() {
    let model = model();

    let set: ServeSettings = bind(&model, &["serve", "--serve"]).unwrap();
    assert!(set.serve.is_set);
    assert_eq!(set.serve.value, 0);

    let valued: ServeSettings = bind(&model, &["serve", "--serve", "123"]).unwrap();
    assert!(valued.serve.is_set);
    assert_eq!(valued.serve.value, 123);

    let unset: ServeSettings = bind(&model, &["serve"]).unwrap();
    assert!(!unset.serve.is_set);
}

#[test]
fn test_pair_binding() {
    let model = model();
    let settings: VarSettings = bind(
        &model,
        &[
            "vars", "--var", "foo=1", "--var", "foo=3", "--var", "bar=4", "--multi", "foo=1",
            "--multi", "foo=3", "--multi", "bar=4",
        ],
    )
    .unwrap();

    assert_eq!(settings.dictionary.len(), 2);
    assert_eq!(settings.dictionary["foo"], 3);
    assert_eq!(settings.dictionary["bar"], 4);

    assert_eq!(settings.lookup.get(&"foo".to_string()), &[1, 3]);
    assert_eq!(settings.lookup.get(&"bar".to_string()), &[4]);
}

#[test]
fn test_vector_argument_keeps_input_order() {
    let model = model();
    let settings: CopySettings = bind(&model, &["copy", "a", "b", "c"]).unwrap();
    assert_eq!(settings.files, vec!["a", "b", "c"]);
}

#[test]
fn test_two_vector_arguments_is_a_configuration_error() {
    let mut schema = SettingsSchema::new("Broken");
    schema.argument::<Vec<String>>("first", "[FIRST]");
    schema.argument::<Vec<String>>("second", "[SECOND]");

    let mut builder = CommandModelBuilder::new(ParsingOptions::default());
    let err = builder.add_command(NodeId::ROOT, "broken", schema).unwrap_err();
    assert_eq!(err, ConfigError::MultipleVectorArguments("broken".to_string()));
}

#[test]
fn test_conversion_failure_names_value() {
    let model = model();
    let err = bind::<AgeSettings>(&model, &["age", "old"]).unwrap_err();
    assert!(matches!(err, BindError::Conversion { ref value, .. } if value == "old"));
}

#[test]
fn test_validation_runs_after_binding() {
    let model = model();
    let err = bind::<AgeSettings>(&model, &["age", "42"]).unwrap_err();
    assert_eq!(err.to_string(), "Dogs do not live that long.");
    assert_eq!(bind::<AgeSettings>(&model, &["age", "4"]).unwrap().age, 4);
}

#[test]
fn test_unknown_command_diagnostic() {
    let mut builder = CommandModelBuilder::new(ParsingOptions::default());
    builder.add_command(NodeId::ROOT, "dog", EmptySettings::schema()).unwrap();
    builder.add_command(NodeId::ROOT, "cat", EmptySettings::schema()).unwrap();
    let model = builder.build().unwrap();

    let err = CommandTreeResolver::new(&model)
        .resolve_args(&args(&["bat", "14"]))
        .unwrap_err();
    assert_eq!(
        err.diagnostic().render_plain(),
        "Error: Unknown command 'bat'.\n\n       bat 14\n       ^^^ Did you mean 'cat'?"
    );
}

#[test]
fn test_parsing_options_deserialize_with_defaults() {
    let options: ParsingOptions = serde_json::from_str(r#"{ "strict": true }"#).unwrap();
    assert!(options.strict);
    assert_eq!(options.suggestion_distance, 2);
    assert!(options.case_sensitivity.commands);
}
