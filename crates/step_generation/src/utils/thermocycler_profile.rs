use crate::command::ProfileStep;

#[derive(Debug, Clone, PartialEq)]
pub struct ThermocyclerProfileRepetitions {
    pub repeating_profile_steps: Vec<ProfileStep>,
    pub num_repetitions: usize,
}

/// Finds the shortest cycle that, repeated, reproduces the whole profile.
///
/// Window sizes `1..=n/2` are tried in order, the first that tiles the profile exactly wins. Without one the whole
/// profile is a single repetition.
pub fn find_thermocycler_profile_repetitions(profile: &[ProfileStep]) -> ThermocyclerProfileRepetitions {
    let length = profile.len();

    for window in 1..=length / 2 {
        if length % window != 0 {
            continue;
        }
        let pattern = &profile[..window];
        if profile
            .chunks(window)
            .all(|chunk| chunk == pattern)
        {
            return ThermocyclerProfileRepetitions {
                repeating_profile_steps: pattern.to_vec(),
                num_repetitions: length / window,
            };
        }
    }

    ThermocyclerProfileRepetitions {
        repeating_profile_steps: profile.to_vec(),
        num_repetitions: 1,
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn step(celsius: f64, hold_seconds: f64) -> ProfileStep {
        ProfileStep {
            hold_seconds,
            celsius,
        }
    }

    #[test]
    fn finds_repeating_pair() {
        // given
        let profile = vec![step(50.0, 50.0), step(60.0, 60.0), step(50.0, 50.0), step(60.0, 60.0)];

        // when
        let result = find_thermocycler_profile_repetitions(&profile);

        // then
        assert_eq!(result, ThermocyclerProfileRepetitions {
            repeating_profile_steps: vec![step(50.0, 50.0), step(60.0, 60.0)],
            num_repetitions: 2,
        });
    }

    #[rstest]
    #[case(vec![])]
    #[case(vec![step(50.0, 50.0)])]
    #[case(vec![step(50.0, 50.0), step(50.0, 50.0), step(50.0, 50.0)])]
    #[case(vec![step(50.0, 50.0), step(60.0, 60.0), step(50.0, 50.0)])]
    #[case(vec![step(50.0, 50.0), step(50.0, 50.0), step(60.0, 60.0), step(60.0, 60.0)])]
    #[case(vec![step(1.0, 1.0), step(2.0, 2.0), step(3.0, 3.0), step(1.0, 1.0), step(2.0, 2.0), step(3.0, 3.0)])]
    fn repeating_the_cycle_reproduces_the_profile(#[case] profile: Vec<ProfileStep>) {
        // when
        let result = find_thermocycler_profile_repetitions(&profile);

        // then
        let repeated = result
            .repeating_profile_steps
            .repeat(result.num_repetitions);
        assert_eq!(repeated, profile);
    }

    #[test]
    fn non_tiling_profile_is_one_repetition() {
        // given
        let profile = vec![step(50.0, 50.0), step(50.0, 50.0), step(60.0, 60.0), step(60.0, 60.0)];

        // when
        let result = find_thermocycler_profile_repetitions(&profile);

        // then
        assert_eq!(result.num_repetitions, 1);
        assert_eq!(result.repeating_profile_steps, profile);
    }
}
