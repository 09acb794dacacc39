//! Hypothesis tests for the group comparisons shown on boxplots.


pub use wilcoxon::{compare_groups, rank_sum_test, signed_rank_test, GroupComparison, WilcoxonResult};
