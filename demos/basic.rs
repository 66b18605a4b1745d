use std::sync::Arc;

use ruletree::{Catalog, Logic, Session};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut session = Session::new(Arc::new(Catalog::builtin()));

    // (age equals 30 OR (income less_than 20000 AND dob before 2000-01-01))
    session.set_logic(&[], Logic::Or);
    session.set_value(&[0], "30");
    session.add_group(&[], Some(0));
    session.set_field_type(&[1, 0], "income").expect("income is built in");
    session.set_value(&[1, 0], "20000");
    session.add_rule(&[1], Some(0));
    session.set_field_type(&[1, 1], "dob").expect("dob is built in");

    // The date is still missing, so the gate refuses to encode.
    if let Err(result) = session.generate_xml() {
        println!("not saved: {result}");
    }

    session.set_value(&[1, 1], "2000-01-01");
    println!("{}", session.root());

    let xml = session.generate_xml().expect("tree is valid");
    println!("{xml}");

    // Loading the document back gives the same tree.
    let before = session.root().clone();
    session.load_xml(&xml).expect("document is well-formed");
    assert_eq!(*session.root(), before);
}
