use jobstat_core::JobRecord;

const FULL_TIME: &str = "full-time";

pub fn find_by_id(records: &[JobRecord], id: i64) -> Option<&JobRecord> {
    records.iter().find(|r| r.id == id)
}

/// First `n` records in feed order; the feed lists newest first.
pub fn top(records: &[JobRecord], n: usize) -> &[JobRecord] {
    &records[..n.min(records.len())]
}

/// Full-time postings of `company` in a zone whose name contains `zone`, both
/// compared case-insensitively, up to `limit` in feed order.
pub fn search<'a>(
    records: &'a [JobRecord],
    company: &str,
    zone: &str,
    limit: usize,
) -> Vec<&'a JobRecord> {
    let company = company.trim().to_lowercase();
    let zone = zone.trim().to_lowercase();
    records
        .iter()
        .filter(|r| {
            r.company_name()
                .is_some_and(|name| name.trim().to_lowercase() == company)
        })
        .filter(|r| r.zone_names().any(|z| z.to_lowercase().contains(&zone)))
        .filter(|r| r.type_names().any(|t| t.to_lowercase() == FULL_TIME))
        .take(limit)
        .collect()
}
