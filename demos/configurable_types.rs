use std::sync::Arc;
use std::thread;

use ruletree::{Session, TypeRegistry, Validator};
use tracing_subscriber::EnvFilter;

const CATALOG: &str = r#"{
  "ruleTypes": [
    {
      "label": "Student Number",
      "value": "student_number",
      "comparators": [{ "label": "Equals", "value": "equals" }],
      "inputField": {
        "type": "string",
        "placeholder": "s1234567",
        "validation": { "pattern": "^s\\d{7}$", "custom": "not_test_account" }
      }
    },
    {
      "label": "Faculty",
      "value": "faculty",
      "comparators": [
        { "label": "Is", "value": "is" },
        { "label": "Is Not", "value": "is_not" }
      ],
      "inputField": {
        "type": "select",
        "options": [
          { "label": "Science", "value": "science" },
          { "label": "Arts", "value": "arts" }
        ]
      }
    }
  ]
}"#;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let registry = Arc::new(TypeRegistry::new());
    registry.load_from_json(CATALOG).expect("catalog is valid");

    let validator = Validator::new().with_check("not_test_account", |v: &str| {
        v.starts_with("s000").then(|| "Test accounts are not eligible".to_owned())
    });

    let mut session = Session::new(registry.snapshot()).with_validator(validator);
    session.set_value(&[0], "s0001234");
    session.add_rule(&[], Some(0));
    session.set_field_type(&[1], "faculty").expect("faculty is configured");
    session.set_value(&[1], "medicine");

    for finding in session.validate().findings() {
        println!("{finding}");
    }

    // Registry changes do not reach sessions that are already running.
    let handle = {
        let registry = Arc::clone(&registry);
        thread::spawn(move || registry.reset_to_default())
    };
    handle.join().expect("reset thread panicked");

    session.set_value(&[0], "s7654321");
    session.set_value(&[1], "arts");
    println!("{}", session.generate_xml().expect("tree is valid"));
    println!("registry now has {} rule types", registry.snapshot().len());
}
