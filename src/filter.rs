use crate::types::Parcel;

/// Parcels whose tracking id or destination contains `query`, ignoring case.
/// Order is preserved; an empty query matches everything.
pub fn filter_parcels<'a>(parcels: &'a [Parcel], query: &str) -> Vec<&'a Parcel> {
    let needle = query.to_lowercase();
    parcels
        .iter()
        .filter(|p| matches(p, &needle))
        .collect()
}

fn matches(parcel: &Parcel, needle: &str) -> bool {
    parcel.tracking_id.to_lowercase().contains(needle)
        || parcel.destination.to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::parcels;

    fn ids(list: &[&Parcel]) -> Vec<String> {
        list.iter().map(|p| p.tracking_id.clone()).collect()
    }

    #[test]
    fn test_empty_query_is_identity() {
        let all = parcels();
        let out = filter_parcels(&all, "");
        assert_eq!(out.len(), all.len());
        for (a, b) in out.iter().zip(all.iter()) {
            assert_eq!(*a, b);
        }
    }

    #[test]
    fn test_destination_match_is_case_insensitive() {
        let all = parcels();
        assert_eq!(ids(&filter_parcels(&all, "kolkata")), vec!["IP-DL-1100-B9"]);
        assert_eq!(ids(&filter_parcels(&all, "KOLKATA")), vec!["IP-DL-1100-B9"]);
    }

    #[test]
    fn test_tracking_id_substring() {
        let all = parcels();
        assert_eq!(ids(&filter_parcels(&all, "tn-6000")), vec!["IP-TN-6000-C5"]);
    }

    #[test]
    fn test_origin_and_location_are_not_searched() {
        let all = parcels();
        // "Mumbai" is only an origin, "Varanasi" only a current location.
        assert!(filter_parcels(&all, "mumbai").is_empty());
        assert!(filter_parcels(&all, "varanasi").is_empty());
    }

    #[test]
    fn test_matches_keep_fixture_order() {
        let all = parcels();
        assert_eq!(
            ids(&filter_parcels(&all, "ip-")),
            vec!["IP-MH-4001-A2", "IP-DL-1100-B9", "IP-TN-6000-C5"]
        );
    }

    #[test]
    fn test_filter_agrees_with_brute_force() {
        let all = parcels();
        for q in ["a", "B", "hub", "Hyderabad", "-c5", "zz", " ", "wb"] {
            let expected: Vec<String> = all
                .iter()
                .filter(|p| {
                    let q = q.to_lowercase();
                    p.tracking_id.to_lowercase().contains(&q)
                        || p.destination.to_lowercase().contains(&q)
                })
                .map(|p| p.tracking_id.clone())
                .collect();
            assert_eq!(ids(&filter_parcels(&all, q)), expected, "query {:?}", q);
        }
    }
}
