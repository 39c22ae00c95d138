use super::*;
use serde::Serialize;

#[derive(Debug, Serialize, PartialEq)]
struct Summary {
    backend: String,
    pulled: usize,
}

impl Formattable for Summary {
    fn format_pretty(&self) -> String {
        format!("{}: {} pulled", self.backend, self.pulled)
    }
}

fn summary() -> Summary {
    Summary {
        backend: "ecr".to_string(),
        pulled: 3,
    }
}

#[test]
fn test_output_format_from_string() {
    assert_eq!(OutputFormat::from("pretty"), OutputFormat::Pretty);
    assert_eq!(OutputFormat::from("JSON"), OutputFormat::Json);
    assert_eq!(OutputFormat::from("yml"), OutputFormat::Yaml);
    assert_eq!(OutputFormat::from("invalid"), OutputFormat::Pretty);
}

#[test]
fn test_color_choice_from_string() {
    assert_eq!(ColorChoice::from("always"), ColorChoice::Always);
    assert_eq!(ColorChoice::from("never"), ColorChoice::Never);
    assert_eq!(ColorChoice::from("whatever"), ColorChoice::Auto);
}

#[test]
fn test_format_pretty() {
    let output = format_output(&summary(), OutputFormat::Pretty).unwrap();
    assert_eq!(output, "ecr: 3 pulled");
}

#[test]
fn test_format_json() {
    let output = format_output(&summary(), OutputFormat::Json).unwrap();
    let json: serde_json::Value = serde_json::from_str(&output).unwrap();

    assert_eq!(json["backend"], "ecr");
    assert_eq!(json["pulled"], 3);
}

#[test]
fn test_format_yaml() {
    let output = format_output(&summary(), OutputFormat::Yaml).unwrap();

    assert!(output.contains("backend: ecr"));
    assert!(output.contains("pulled: 3"));
}

#[test]
fn test_plain_spinner_is_hidden() {
    let formatter = PlainFormatter;
    assert!(formatter.spinner("Enumerating remote images...").is_hidden());
}

#[test]
fn test_never_color_gives_plain_output() {
    let formatter = create_formatter(ColorChoice::Never);
    assert!(formatter.spinner("Logging in to registries...").is_hidden());
}
