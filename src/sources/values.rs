//! Explicit literal value lists.

use crate::config_err;
use crate::diagnostics::CartesianError;
use crate::registry::ParameterProvider;
use crate::signature::ParameterSlot;
use crate::value::Value;

/// Yields a fixed list of literals, in the order given.
#[derive(Debug, Clone, Default)]
pub struct ValuesProvider {
    values: Vec<Value>,
}

impl ValuesProvider {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }
}

impl ParameterProvider for ValuesProvider {
    fn provide_arguments(&self, _slot: &ParameterSlot) -> Result<Vec<Value>, CartesianError> {
        Ok(self.values.clone())
    }
}

/// A literal list must hold exactly one kind of value. `null` may accompany any kind.
pub(crate) fn check_literals(values: &[Value]) -> Result<(), CartesianError> {
    let mut kinds = values
        .iter()
        .filter(|v| !matches!(v, Value::Null))
        .map(Value::kind_name);
    let Some(first) = kinds.next() else {
        return Ok(());
    };
    match kinds.find(|kind| *kind != first) {
        Some(other) => Err(config_err!(
            "",
            "exactly one type of input must be provided, found both {} and {} literals",
            first,
            other
        )
        .with_help("split the literals across separate parameters or convert them to one type")),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::ErrorType;
    use crate::value::ParamType;

    #[test]
    fn literals_of_one_kind_pass() {
        let values = vec![Value::from(1), Value::from(2), Value::Null];
        assert!(check_literals(&values).is_ok());
        assert!(check_literals(&[]).is_ok());
    }

    #[test]
    fn mixed_literals_are_a_configuration_error() {
        let values = vec![Value::from(1), Value::from("two")];
        let err = check_literals(&values).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Configuration);
        assert!(err.message().contains("int and string"));
    }

    #[test]
    fn provider_yields_literals_in_order() {
        let slot = ParameterSlot::new(0, "n", ParamType::Int);
        let provider = ValuesProvider::new(vec![Value::from(3), Value::from(1)]);
        assert_eq!(
            provider.provide_arguments(&slot).unwrap(),
            vec![Value::Int(3), Value::Int(1)]
        );
    }
}
