//! Sequence windowing.
//!
//! A windowing policy is a pure function of (sequence length, token budget)
//! that selects which residue span(s) survive truncation. Decisions operate
//! on residue units, not characters, so the same policy applies to the plain
//! amino-acid alphabet and to the two-character combined alphabet.
use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum WindowPolicy {
    /// Keep the first `budget` residues.
    Left,
    /// Keep the last `budget` residues.
    Right,
    /// Keep the first ceil(budget/2) and last floor(budget/2) residues as two
    /// segments; the caller joins them with a separator token whose slot the
    /// budget derivation already reserved.
    Both,
    /// Keep the centered `budget` residues, trimming both ends.
    Internal,
}

impl WindowPolicy {
    /// Select the retained segment(s) of `units`. Returns one segment for
    /// every policy when the sequence already fits the budget, two segments
    /// only for `both` on an over-budget sequence.
    pub fn select<'a>(&self, units: &'a [String], budget: usize) -> Vec<&'a [String]> {
        let len = units.len();
        if len <= budget {
            return vec![units];
        }
        match self {
            WindowPolicy::Left => vec![&units[..budget]],
            WindowPolicy::Right => vec![&units[len - budget..]],
            WindowPolicy::Both => {
                let head = budget.div_ceil(2);
                let tail = budget / 2;
                vec![&units[..head], &units[len - tail..]]
            }
            WindowPolicy::Internal => {
                let left_trim = (len - budget) / 2;
                vec![&units[left_trim..left_trim + budget]]
            }
        }
    }
}

/// Chunk a sequence string into residue units of `unit_width` characters.
pub fn split_residues(sequence: &str, unit_width: usize) -> Vec<String> {
    let chars: Vec<char> = sequence.chars().collect();
    chars
        .chunks(unit_width.max(1))
        .map(|c| c.iter().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn units(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("r{i}")).collect()
    }

    fn retained(policy: WindowPolicy, n: usize, budget: usize) -> Vec<String> {
        policy
            .select(&units(n), budget)
            .iter()
            .flat_map(|seg| seg.iter().cloned())
            .collect()
    }

    #[test]
    fn short_sequences_pass_through_unchanged() {
        for policy in [
            WindowPolicy::Left,
            WindowPolicy::Right,
            WindowPolicy::Both,
            WindowPolicy::Internal,
        ] {
            let all = units(10);
            let segs = policy.select(&all, 10);
            assert_eq!(segs.len(), 1);
            assert_eq!(segs[0], &units(10)[..]);
            assert_eq!(retained(policy, 3, 256).len(), 3);
        }
    }

    #[test]
    fn retained_length_never_exceeds_budget() {
        for policy in [
            WindowPolicy::Left,
            WindowPolicy::Right,
            WindowPolicy::Both,
            WindowPolicy::Internal,
        ] {
            for (n, budget) in [(100, 256), (300, 256), (600, 256), (7, 1), (5, 4)] {
                assert!(retained(policy, n, budget).len() <= budget);
            }
        }
    }

    #[test]
    fn left_keeps_prefix_right_keeps_suffix() {
        let all = units(300);
        assert_eq!(retained(WindowPolicy::Left, 300, 256), all[..256]);
        assert_eq!(retained(WindowPolicy::Right, 300, 256), all[44..]);
    }

    #[test]
    fn internal_is_centered() {
        // 600 residues at budget 256 trims 172 from each end.
        let all = units(600);
        assert_eq!(retained(WindowPolicy::Internal, 600, 256), all[172..428]);
        // Odd removable length: right trim is one longer than left trim.
        let all = units(10);
        assert_eq!(retained(WindowPolicy::Internal, 10, 3), all[3..6]);
    }

    #[test]
    fn both_splits_into_disjoint_head_and_tail() {
        let all = units(600);
        let segs = WindowPolicy::Both.select(&all, 255);
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[0], &all[..128]);
        assert_eq!(segs[1], &all[473..]);
        assert_eq!(segs[0].len() + segs[1].len(), 255);
    }

    #[test]
    fn window_lengths_for_budget_256() {
        for (n, expect) in [(100, 100), (300, 256), (600, 256)] {
            assert_eq!(retained(WindowPolicy::Left, n, 256).len(), expect);
        }
    }

    #[test]
    fn split_residues_handles_both_alphabets() {
        assert_eq!(split_residues("MKT", 1), vec!["M", "K", "T"]);
        assert_eq!(split_residues("MaKbTc", 2), vec!["Ma", "Kb", "Tc"]);
    }
}
