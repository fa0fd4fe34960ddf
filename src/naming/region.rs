//! AWS region short codes.

const REGION_CODES: &[(&str, &str)] = &[
    ("us-east-1", "use1"),
    ("us-east-2", "use2"),
    ("us-west-1", "usw1"),
    ("us-west-2", "usw2"),
    ("ca-central-1", "cac1"),
    ("sa-east-1", "sae1"),
    ("eu-west-1", "euw1"),
    ("eu-west-2", "euw2"),
    ("eu-west-3", "euw3"),
    ("eu-central-1", "euc1"),
    ("eu-central-2", "euc2"),
    ("eu-north-1", "eun1"),
    ("eu-south-1", "eus1"),
    ("eu-south-2", "eus2"),
    ("ap-southeast-1", "apse1"),
    ("ap-southeast-2", "apse2"),
    ("ap-northeast-1", "apne1"),
];

/// Short code for a region.
///
/// Regions missing from the table get a lossy fallback: hyphens stripped,
/// then `north` -> `n` and `south` -> `s`. Two unlisted regions can map to
/// the same code.
pub fn region_code(region: &str) -> String {
    REGION_CODES
        .iter()
        .find(|(name, _)| *name == region)
        .map(|(_, code)| code.to_string())
        .unwrap_or_else(|| fallback_code(region))
}

fn fallback_code(region: &str) -> String {
    region
        .replace('-', "")
        .replace("north", "n")
        .replace("south", "s")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listed_regions() {
        assert_eq!(region_code("eu-central-2"), "euc2");
        assert_eq!(region_code("us-east-1"), "use1");
        assert_eq!(region_code("ap-southeast-2"), "apse2");
        assert_eq!(region_code("eu-north-1"), "eun1");
    }

    #[test]
    fn test_fallback_transformation() {
        assert_eq!(region_code("me-south-1"), "mes1");
        assert_eq!(region_code("ap-south-1"), "aps1");
        assert_eq!(region_code("ap-northeast-3"), "apneast3");
        assert_eq!(region_code("af-south-1"), "afs1");
        assert_eq!(region_code("il-central-1"), "ilcentral1");
    }

    #[test]
    fn test_table_codes_are_unique() {
        let mut codes: Vec<&str> = REGION_CODES.iter().map(|(_, c)| *c).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), REGION_CODES.len());
    }
}
