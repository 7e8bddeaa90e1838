//! Roster formatting: tier-name resolution and the one-line-per-patron report.

use std::collections::HashMap;
use std::io::{self, Write};

use crate::pledges::{Member, TierLookup};

/// Collapse internal whitespace: split on Unicode whitespace and join the
/// tokens with no separator. `"  Jane   Doe "` becomes `"JaneDoe"`.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect()
}

/// Resolve a member's entitled tier ids to display names, sorted
/// lexicographically. A tier id with no lookup entry resolves to the empty
/// string.
pub fn entitled_tier_names(member: &Member, tiers: &TierLookup) -> Vec<String> {
    let mut names: Vec<String> = member
        .tier_ids
        .iter()
        .map(|id| collapse_whitespace(tiers.get(id).map(String::as_str).unwrap_or("")))
        .collect();
    names.sort();
    names
}

/// One report line for a member.
pub fn member_line(member: &Member, tiers: &TierLookup) -> String {
    format!(
        "fullName={} email={} pledgeAmount:{}, tiers: {}",
        member.full_name,
        member.email,
        member.pledge_amount_cents,
        entitled_tier_names(member, tiers).join(",")
    )
}

/// Print the whole roster, one line per member. The accumulator map has no
/// useful iteration order, so the roster is sorted by member id to keep the
/// output stable across runs.
pub fn print_roster<W: Write>(
    mut out: W,
    members: &HashMap<String, Member>,
    tiers: &TierLookup,
) -> io::Result<()> {
    let mut roster: Vec<&Member> = members.values().collect();
    roster.sort_by(|a, b| a.id.cmp(&b.id));

    for member in roster {
        writeln!(out, "{}", member_line(member, tiers))?;
    }
    Ok(())
}
