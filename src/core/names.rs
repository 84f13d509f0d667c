//! Well-known parameter names and the legacy aliases that map onto them.

use phf::phf_map;
use std::borrow::Cow;

pub const TRANS_RATE: &str = "trans.rate";
pub const ACT_RATE: &str = "act.rate";
pub const REC_RATE: &str = "rec.rate";
pub const B_RATE: &str = "b.rate";
pub const DS_RATE: &str = "ds.rate";
pub const DI_RATE: &str = "di.rate";
pub const DR_RATE: &str = "dr.rate";
pub const BALANCE: &str = "balance";

/// The rates every group or mode may carry.
pub const RATES: [&str; 7] = [
    TRANS_RATE, ACT_RATE, REC_RATE, B_RATE, DS_RATE, DI_RATE, DR_RATE,
];

/// Group 1 rates whose presence switches on vital dynamics.
pub const VITAL_RATES: [&str; 4] = [B_RATE, DS_RATE, DI_RATE, DR_RATE];

/// Legacy spellings accepted in place of the canonical rate names.
pub static ALIASES: phf::Map<&'static str, &'static str> = phf_map! {
    "inf.prob" => TRANS_RATE,
    "a.rate" => B_RATE,
};

/// Append a group suffix such as `.g2` to a rate name.
pub fn suffixed(name: &str, suffix: &str) -> String {
    format!("{name}{suffix}")
}

/// Map a supplied key onto its canonical name, keeping any group suffix.
///
/// `inf.prob.g2` becomes `trans.rate.g2` when `.g2` is the group suffix. Keys without a known
/// alias are returned unchanged.
pub fn canonical_name<'a>(key: &'a str, suffix: &str) -> Cow<'a, str> {
    let (base, tail) = match key.strip_suffix(suffix) {
        Some(base) => (base, suffix),
        None => (key, ""),
    };
    match ALIASES.get(base) {
        Some(canonical) => Cow::Owned(format!("{canonical}{tail}")),
        None => Cow::Borrowed(key),
    }
}
