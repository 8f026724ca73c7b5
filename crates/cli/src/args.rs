use std::sync::Arc;

use clap::ValueEnum;
use step_generation::command_key::{CommandKeyGenerator, SequentialKeyGenerator, UuidKeyGenerator};
use step_generation::timeline::OnStepError;

/// Args decouple of CLI arg handling requirements from the internal data structures

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[value(rename_all = "lower")]
pub enum OnStepErrorArg {
    #[default]
    Halt,
    Continue,
}

impl From<OnStepErrorArg> for OnStepError {
    fn from(value: OnStepErrorArg) -> Self {
        match value {
            OnStepErrorArg::Halt => Self::Halt,
            OnStepErrorArg::Continue => Self::Continue,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[value(rename_all = "lower")]
pub enum KeyGeneratorArg {
    /// Random keys
    #[default]
    Uuid,
    /// `command-1`, `command-2`, ...
    Sequential,
}

impl KeyGeneratorArg {
    pub fn build(&self) -> Arc<dyn CommandKeyGenerator> {
        match self {
            KeyGeneratorArg::Uuid => Arc::new(UuidKeyGenerator),
            KeyGeneratorArg::Sequential => Arc::new(SequentialKeyGenerator::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(OnStepErrorArg::Halt, OnStepError::Halt)]
    #[case(OnStepErrorArg::Continue, OnStepError::Continue)]
    fn on_step_error(#[case] arg: OnStepErrorArg, #[case] expected: OnStepError) {
        assert_eq!(OnStepError::from(arg), expected);
    }

    #[test]
    fn sequential_keys() {
        // given
        let key_generator = KeyGeneratorArg::Sequential.build();

        // when
        let keys = [key_generator.next_key(), key_generator.next_key()];

        // then
        assert_eq!(keys, ["command-1".to_string(), "command-2".to_string()]);
    }

    #[test]
    fn value_names() {
        // expect
        assert_eq!(
            OnStepErrorArg::from_str("continue", false),
            Ok(OnStepErrorArg::Continue)
        );
        assert_eq!(
            KeyGeneratorArg::from_str("sequential", false),
            Ok(KeyGeneratorArg::Sequential)
        );
    }
}
