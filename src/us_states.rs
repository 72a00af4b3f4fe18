// Lookup keys are the lowercased full names; values are the postal codes the
// store uses as province keys for US rows.
static US_STATE_ABBREV: &[(&str, &str)] = &[
	("alabama", "AL"),
	("alaska", "AK"),
	("american samoa", "AS"),
	("arizona", "AZ"),
	("arkansas", "AR"),
	("california", "CA"),
	("colorado", "CO"),
	("connecticut", "CT"),
	("delaware", "DE"),
	("district of columbia", "DC"),
	("florida", "FL"),
	("georgia", "GA"),
	("guam", "GU"),
	("hawaii", "HI"),
	("idaho", "ID"),
	("illinois", "IL"),
	("indiana", "IN"),
	("iowa", "IA"),
	("kansas", "KS"),
	("kentucky", "KY"),
	("louisiana", "LA"),
	("maine", "ME"),
	("maryland", "MD"),
	("massachusetts", "MA"),
	("michigan", "MI"),
	("minnesota", "MN"),
	("mississippi", "MS"),
	("missouri", "MO"),
	("montana", "MT"),
	("nebraska", "NE"),
	("nevada", "NV"),
	("new hampshire", "NH"),
	("new jersey", "NJ"),
	("new mexico", "NM"),
	("new york", "NY"),
	("north carolina", "NC"),
	("north dakota", "ND"),
	("northern mariana islands", "MP"),
	("ohio", "OH"),
	("oklahoma", "OK"),
	("oregon", "OR"),
	("pennsylvania", "PA"),
	("puerto rico", "PR"),
	("rhode island", "RI"),
	("south carolina", "SC"),
	("south dakota", "SD"),
	("tennessee", "TN"),
	("texas", "TX"),
	("utah", "UT"),
	("vermont", "VT"),
	("virgin islands", "VI"),
	("virginia", "VA"),
	("washington", "WA"),
	("west virginia", "WV"),
	("wisconsin", "WI"),
	("wyoming", "WY"),
];


/// Canonical short form for a US state name, case-insensitive. Returns
/// `None` for anything not in the table; callers fall back to the raw name.
pub fn us_state_abbrev(name: &str) -> Option<&'static str> {
	let name = name.trim().to_ascii_lowercase();
	US_STATE_ABBREV.iter()
		.find(|(full, _)| *full == name)
		.map(|(_, abbrev)| *abbrev)
}


#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn lookup_is_case_insensitive() {
		assert_eq!(us_state_abbrev("california"), Some("CA"));
		assert_eq!(us_state_abbrev("California"), Some("CA"));
		assert_eq!(us_state_abbrev(" NEW YORK "), Some("NY"));
	}

	#[test]
	fn unmapped_names_miss() {
		assert_eq!(us_state_abbrev("Ontario"), None);
		assert_eq!(us_state_abbrev(""), None);
	}
}
