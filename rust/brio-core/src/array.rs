//! Ordered, 1-based, mutable array values.

use crate::value::{Value, CMP_UNORDERED};
use std::fmt;

#[derive(Debug, Clone, Default)]
pub struct ArrayValue {
    elements: Vec<Value>,
}

impl ArrayValue {
    pub fn new() -> Self {
        ArrayValue::default()
    }

    pub fn from_values(elements: Vec<Value>) -> Self {
        ArrayValue { elements }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Appends a value. An array argument is flattened one level: its
    /// elements are appended individually, nested arrays inside them are
    /// left alone.
    pub fn push(&mut self, value: Value) {
        match value.into_data() {
            crate::value::ValueData::Array(arr) => self.elements.extend(arr.elements),
            other => self.elements.push(Value::new(other)),
        }
    }

    /// Appends a value without flattening.
    pub fn push_as_is(&mut self, value: Value) {
        self.elements.push(value);
    }

    /// 1-based read. Index 0 and out-of-range reads return `None`.
    pub fn get(&self, index: usize) -> Option<&Value> {
        index.checked_sub(1).and_then(|i| self.elements.get(i))
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Value> {
        index.checked_sub(1).and_then(|i| self.elements.get_mut(i))
    }

    /// 1-based write. A slot beyond the current length grows the array,
    /// padding intervening slots with integer zero. Index 0 is rejected.
    pub fn set(&mut self, index: usize, value: Value) -> bool {
        if index == 0 {
            return false;
        }
        while self.elements.len() < index - 1 {
            self.elements.push(Value::from(0i64));
        }
        if index <= self.elements.len() {
            self.elements[index - 1] = value;
        } else {
            self.elements.push(value);
        }
        true
    }

    /// 1-based removal; later elements shift down.
    pub fn remove(&mut self, index: usize) -> Option<Value> {
        let i = index.checked_sub(1)?;
        if i < self.elements.len() {
            Some(self.elements.remove(i))
        } else {
            None
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.elements.iter()
    }

    pub fn elements(&self) -> &[Value] {
        &self.elements
    }

    pub fn matches(&self, other: &ArrayValue) -> bool {
        self.elements.len() == other.elements.len()
            && self
                .elements
                .iter()
                .zip(&other.elements)
                .all(|(a, b)| a.matches(b))
    }

    /// Lexicographic: shorter arrays order first, equal lengths compare
    /// element by element. An unordered element pair makes the whole
    /// comparison unordered.
    pub fn compare(&self, other: &ArrayValue) -> i32 {
        match self.elements.len().cmp(&other.elements.len()) {
            std::cmp::Ordering::Less => return -1,
            std::cmp::Ordering::Greater => return 1,
            std::cmp::Ordering::Equal => {}
        }
        for (a, b) in self.elements.iter().zip(&other.elements) {
            match a.compare(b) {
                0 => continue,
                CMP_UNORDERED => return CMP_UNORDERED,
                ord => return ord,
            }
        }
        0
    }

    pub(crate) fn copy_at_depth(&self, depth: usize) -> ArrayValue {
        ArrayValue {
            elements: self
                .elements
                .iter()
                .map(|v| v.copy_at_depth(depth + 1))
                .collect(),
        }
    }
}

impl fmt::Display for ArrayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items: Vec<String> = self.elements.iter().map(|v| v.display_quoted()).collect();
        write!(f, "[{}]", items.join(", "))
    }
}

impl FromIterator<Value> for ArrayValue {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        ArrayValue {
            elements: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i64]) -> ArrayValue {
        values.iter().map(|&n| Value::from(n)).collect()
    }

    #[test]
    fn test_push_flattens_one_level() {
        let mut arr = ArrayValue::new();
        arr.push(Value::from(ints(&[1, 2])));
        arr.push(Value::from(3i64));
        assert_eq!(arr.len(), 3);
        assert!(arr.matches(&ints(&[1, 2, 3])));
    }

    #[test]
    fn test_push_as_is_keeps_nesting() {
        let mut arr = ArrayValue::new();
        arr.push_as_is(Value::from(ints(&[1, 2])));
        assert_eq!(arr.len(), 1);
        assert_eq!(arr.get(1).unwrap().element_count(), 2);
    }

    #[test]
    fn test_set_beyond_length_zero_pads() {
        let mut arr = ArrayValue::new();
        assert!(arr.set(4, Value::from("x")));
        assert_eq!(arr.len(), 4);
        assert!(arr.get(2).unwrap().matches(&Value::from(0i64)));
        assert!(arr.get(4).unwrap().matches(&Value::from("x")));
    }

    #[test]
    fn test_one_based_bounds() {
        let mut arr = ints(&[5]);
        assert!(arr.get(0).is_none());
        assert!(!arr.set(0, Value::from(9i64)));
        assert!(arr.remove(0).is_none());
    }

    #[test]
    fn test_remove_collapses() {
        let mut arr = ints(&[1, 2, 3]);
        let removed = arr.remove(2).unwrap();
        assert!(removed.matches(&Value::from(2i64)));
        assert!(arr.matches(&ints(&[1, 3])));
    }

    #[test]
    fn test_compare_by_length_then_elements() {
        assert_eq!(ints(&[9]).compare(&ints(&[1, 1])), -1);
        assert_eq!(ints(&[1, 2]).compare(&ints(&[1, 3])), -1);
        assert_eq!(ints(&[1, 2]).compare(&ints(&[1, 2])), 0);
    }

    #[test]
    fn test_display() {
        let mut arr = ints(&[1]);
        arr.push_as_is(Value::from("a\"b"));
        assert_eq!(arr.to_string(), "[1, \"a\\\"b\"]");
    }
}
