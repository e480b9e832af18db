use super::job::Job;

/// Case-insensitive substring match over the fields a dispatcher types into
/// the search box. A blank query matches everything.
pub fn matches(job: &Job, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }

    searchable_fields(job).any(|field| field.to_lowercase().contains(&needle))
}

fn searchable_fields(job: &Job) -> impl Iterator<Item = &str> {
    let customer = job.customer.as_ref();
    let forklift = job.forklift.as_ref();

    [
        job.title.as_deref(),
        job.description.as_deref(),
        customer.and_then(|c| c.name.as_deref()),
        customer.and_then(|c| c.address.as_deref()),
        job.assigned_technician_name.as_deref(),
        forklift.and_then(|f| f.serial_number.as_deref()),
        forklift.and_then(|f| f.model.as_deref()),
        job.job_number.as_deref(),
    ]
    .into_iter()
    .flatten()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::job::fixtures::job;
    use crate::board::job::{CustomerRef, ForkliftRef};

    fn searchable() -> Job {
        let mut j = job("a");
        j.title = Some("Hydraulic leak".to_string());
        j.description = Some("Mast drops under load".to_string());
        j.job_number = Some("JOB-2024-0042".to_string());
        j.assigned_technician_name = Some("Siti Rahman".to_string());
        j.customer = Some(CustomerRef {
            name: Some("Northport Cold Storage".to_string()),
            address: Some("12 Jalan Perak".to_string()),
        });
        j.forklift = Some(ForkliftRef {
            serial_number: Some("ACW-102".to_string()),
            model: Some("Toyota 8FBE".to_string()),
        });
        j
    }

    #[test]
    fn test_blank_query_matches_everything() {
        assert!(matches(&job("bare"), ""));
        assert!(matches(&job("bare"), "   "));
    }

    #[test]
    fn test_each_field_is_searched() {
        let j = searchable();
        for query in [
            "hydraulic",
            "under load",
            "northport",
            "jalan",
            "siti",
            "acw-102",
            "8fbe",
            "0042",
        ] {
            assert!(matches(&j, query), "query {:?} should match", query);
        }
    }

    #[test]
    fn test_case_insensitive_and_trimmed() {
        let j = searchable();
        assert!(matches(&j, "  HYDRAULIC  "));
        assert!(matches(&j, "Acw-102"));
    }

    #[test]
    fn test_no_match() {
        assert!(!matches(&searchable(), "brake"));
        assert!(!matches(&job("bare"), "anything"));
    }
}
