//! Cross-module semantics: copy independence, coercion round trips, and
//! tabular behavior that spans containers.

use brio_core::{
    ArrayValue, Decimal, RecordValue, TableValue, Value, ValueKind, CMP_UNORDERED,
};

#[test]
fn copy_of_nested_array_is_independent() {
    let mut inner = ArrayValue::new();
    inner.push_as_is(Value::from(1i64));
    let mut outer = ArrayValue::new();
    outer.push_as_is(Value::from(inner));
    let mut original = Value::from(outer);

    let mut copy = original.deep_copy();
    copy.as_array_mut()
        .unwrap()
        .get_mut(1)
        .unwrap()
        .push_element(Value::from(99i64))
        .unwrap();

    assert_eq!(original.as_array().unwrap().get(1).unwrap().element_count(), 1);
    assert_eq!(copy.as_array().unwrap().get(1).unwrap().element_count(), 2);

    original
        .as_array_mut()
        .unwrap()
        .set(1, Value::from("replaced"));
    assert_eq!(copy.as_array().unwrap().get(1).unwrap().element_count(), 2);
}

#[test]
fn copy_of_record_is_independent() {
    let mut rec = RecordValue::new();
    rec.set("ITEMS", Value::from(ArrayValue::new()));
    let original = Value::from(rec);

    let mut copy = original.deep_copy();
    copy.as_record_mut()
        .unwrap()
        .get_mut("ITEMS")
        .unwrap()
        .push_element(Value::from(1i64))
        .unwrap();

    assert_eq!(original.member("ITEMS").unwrap().element_count(), 0);
    assert_eq!(copy.member("ITEMS").unwrap().element_count(), 1);
}

#[test]
fn array_flatten_scenario() {
    let mut arr = Value::from(ArrayValue::new());
    let mut pair = ArrayValue::new();
    pair.push_as_is(Value::from(1i64));
    pair.push_as_is(Value::from(2i64));
    arr.push_element(Value::from(pair)).unwrap();
    arr.push_element(Value::from(3i64)).unwrap();

    assert_eq!(arr.element_count(), 3);
    let inner = arr.as_array().unwrap();
    for (i, expected) in [1i64, 2, 3].iter().enumerate() {
        assert!(inner.get(i + 1).unwrap().matches(&Value::from(*expected)));
    }
}

#[test]
fn decimal_scale_scenario() {
    let mut v = Value::from(5i64);
    v.coerce(ValueKind::Decimal).unwrap();
    let scaled = v.get_decimal().rescale(2);
    assert_eq!(scaled.to_string(), "5.00");

    let mut back = Value::from(scaled);
    back.coerce(ValueKind::Integer).unwrap();
    assert!(back.matches(&Value::from(5i64)));
}

#[test]
fn table_round_trip_coerces_and_zero_fills() {
    let mut t = TableValue::from_specs(&["ID@Integer", "NAME", "RATE@Decimal"]).unwrap();
    let mut rec = RecordValue::new();
    rec.set("ID", Value::from("17"));
    rec.set("NAME", Value::from(true));
    t.push_record(&rec).unwrap();

    let back = t.row_record(1).unwrap();
    assert!(back.get("ID").unwrap().matches(&Value::from(17i64)));
    assert!(back.get("NAME").unwrap().matches(&Value::from("true")));
    assert_eq!(back.get("RATE").unwrap().get_decimal(), Decimal::zero());
}

#[test]
fn join_emits_one_row_per_matching_pair() {
    let mut orders = TableValue::from_specs(&["CUST@Integer", "ITEM"]).unwrap();
    for (c, item) in [(1i64, "pen"), (2, "ink"), (2, "pad")] {
        orders
            .push_row(vec![Value::from(c), Value::from(item)])
            .unwrap();
    }
    let mut names = TableValue::from_specs(&["CUST@Integer", "NAME"]).unwrap();
    for (c, name) in [(2i64, "ada"), (3, "bob")] {
        names
            .push_row(vec![Value::from(c), Value::from(name)])
            .unwrap();
    }

    let joined = orders.join(&names, "CUST").unwrap();
    assert_eq!(joined.row_count(), 2);
    for i in 1..=2 {
        let row = joined.row_record(i).unwrap();
        assert!(row.get("CUST").unwrap().matches(&Value::from(2i64)));
        assert!(row.get("NAME").unwrap().matches(&Value::from("ada")));
    }
}

#[test]
fn fold_style_equality_of_copies() {
    // matches() must hold between a value and its deep copy for every
    // composite kind the runtime stores.
    let mut rec = RecordValue::new();
    rec.set("A", Value::from(1i64));
    let mut t = TableValue::from_specs(&["X@Double"]).unwrap();
    t.push_row(vec![Value::from(0.5)]).unwrap();

    for v in [
        Value::from(ArrayValue::new()),
        Value::from(rec),
        Value::from(t),
    ] {
        assert!(v.matches(&v.deep_copy()));
    }
}

#[test]
fn compare_is_unordered_across_composite_kinds() {
    let rec = Value::from(RecordValue::new());
    let table = Value::from(TableValue::empty());
    assert_eq!(rec.compare(&table), CMP_UNORDERED);
}
