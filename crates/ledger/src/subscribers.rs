use std::collections::BTreeMap;

use model::subscription::SubscriptionRecord;

/// Ledger rows grouped by subscriber.
#[derive(Debug, Default)]
pub struct Subscribers {
    groups: BTreeMap<i64, Vec<SubscriptionRecord>>,
}

impl Subscribers {
    pub fn collect<I>(records: I) -> Subscribers
    where
        I: IntoIterator<Item = SubscriptionRecord>,
    {
        let mut groups: BTreeMap<i64, Vec<SubscriptionRecord>> = BTreeMap::new();
        for record in records {
            groups.entry(record.subscriber_id).or_default().push(record);
        }
        Subscribers { groups }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn record_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.groups.keys().copied()
    }

    pub fn records(&self, id: i64) -> &[SubscriptionRecord] {
        self.groups.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn groups(&self) -> impl Iterator<Item = (i64, &[SubscriptionRecord])> {
        self.groups.iter().map(|(id, records)| (*id, records.as_slice()))
    }

    /// Most recent subscription. Equal dates resolve to the row further down the sheet.
    pub fn last(&self, id: i64) -> Option<&SubscriptionRecord> {
        self.records(id).iter().max_by(|a, b| {
            a.recorded_at
                .cmp(&b.recorded_at)
                .then_with(|| a.row.cmp(&b.row))
        })
    }
}
