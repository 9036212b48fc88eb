use pretty_assertions::assert_eq;
use rill_core::record;

use super::*;

struct Fixture {
    oosvars: Mlmv,
    locals: LocalStack,
    stream: StreamContext,
    options: PutOptions,
}

impl Fixture {
    fn new(options: PutOptions) -> Self {
        Fixture {
            oosvars: Mlmv::empty_map(),
            locals: LocalStack::new(),
            stream: StreamContext::new(),
            options,
        }
    }

    fn vars(&mut self, rec: Record) -> Variables<'_> {
        Variables::new(
            rec,
            &mut self.oosvars,
            &mut self.locals,
            &self.stream,
            &[],
            &self.options,
        )
    }
}

#[test]
fn field_reads_are_inferred_and_cached() {
    let mut fixture = Fixture::new(PutOptions::default());
    let mut vars = fixture.vars(record([("x", "3"), ("y", "abc"), ("e", "")]));
    assert_eq!(vars.field("x"), Mlrval::Int(3));
    assert_eq!(vars.field("y"), Mlrval::from("abc"));
    assert_eq!(vars.field("e"), Mlrval::Empty);
    assert_eq!(vars.field("nosuch"), Mlrval::Absent);
    assert_eq!(vars.typed_overlay.len(), 3);
}

#[test]
fn inference_mode_applies_to_fields() {
    let mut fixture = Fixture::new(PutOptions::default().with_type_inference(TypeInference::StringOnly));
    let mut vars = fixture.vars(record([("x", "3")]));
    assert_eq!(vars.field("x"), Mlrval::from("3"));
}

#[test]
fn assignment_updates_text_and_type() {
    let mut fixture = Fixture::new(PutOptions::default());
    let mut vars = fixture.vars(record([("x", "3")]));
    vars.assign_field("z", Mlrval::Float(0.5));
    vars.assign_field("x", Mlrval::Absent);
    assert_eq!(vars.field("z"), Mlrval::Float(0.5));
    let outcome = vars.finish();
    assert_eq!(outcome.record, record([("x", "3"), ("z", "0.5")]));
    assert!(outcome.filter_condition);
}

#[test]
fn map_assignment_flattens() {
    let mut fixture = Fixture::new(PutOptions::default().with_flatten_separator(":"));
    let mut vars = fixture.vars(Record::new());
    let mut value = Mlmv::empty_map();
    value.put_terminal(&["a".to_owned()], Mlrval::Int(1));
    value.put_terminal(&["b".to_owned(), "c".to_owned()], Mlrval::Int(2));
    vars.assign_field_value("m", value);
    assert_eq!(vars.finish().record, record([("m:a", "1"), ("m:b:c", "2")]));
}

#[test]
fn unset_drops_overlay_too() {
    let mut fixture = Fixture::new(PutOptions::default());
    let mut vars = fixture.vars(record([("x", "3")]));
    assert_eq!(vars.field("x"), Mlrval::Int(3));
    vars.unset_field("x");
    assert_eq!(vars.field("x"), Mlrval::Absent);
}

#[test]
fn record_as_map_prefers_overlay() {
    let mut fixture = Fixture::new(PutOptions::default());
    let mut vars = fixture.vars(record([("x", "0x10"), ("y", "hi")]));
    vars.assign_field("y", Mlrval::Int(5));
    let map = vars.record_as_map();
    assert_eq!(map.get("x"), Some(&Mlmv::from(Mlrval::Int(16))));
    assert_eq!(map.get("y"), Some(&Mlmv::from(Mlrval::Int(5))));
}
