//! Statistics aggregation engine.
//!
//! Pure, deterministic rollup computation over in-memory snapshots of users
//! and lists. The persistence layer feeds [`aggregate`] with flattened
//! facts and writes the resulting [`StatsRollup`] into the singleton
//! snapshot row; nothing here touches the database.
//!
//! Repeated aggregation over unchanged input yields identical output,
//! including the top-10 orderings: ties are broken by first-seen order,
//! which is the input iteration order.

use std::collections::HashMap;

use chrono::{Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::status::ListStatus;
use crate::types::{DbId, Timestamp};

/// Number of entries kept in the top-added / top-purchased rankings.
const TOP_N: usize = 10;

// ---------------------------------------------------------------------------
// Time boundaries
// ---------------------------------------------------------------------------

/// The four time boundaries every recompute is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeBounds {
    /// `now` minus 30 days.
    pub thirty_days_ago: Timestamp,
    /// Midnight on the first day of the current month.
    pub month_start: Timestamp,
    /// Midnight on the Sunday starting the current week.
    pub week_start: Timestamp,
    /// Midnight today.
    pub today_start: Timestamp,
}

impl TimeBounds {
    /// Compute all boundaries from a single `now` instant (UTC).
    pub fn compute(now: Timestamp) -> Self {
        let today = now.date_naive();
        let today_start = today
            .and_hms_opt(0, 0, 0)
            .expect("midnight is always a valid time")
            .and_utc();

        let month_start = today
            .with_day(1)
            .expect("day 1 is always a valid day")
            .and_hms_opt(0, 0, 0)
            .expect("midnight is always a valid time")
            .and_utc();

        // Week starts on Sunday, matching date-minus-weekday arithmetic.
        let days_from_sunday = today.weekday().num_days_from_sunday() as i64;
        let week_start = today_start - Duration::days(days_from_sunday);

        TimeBounds {
            thirty_days_ago: now - Duration::days(30),
            month_start,
            week_start,
            today_start,
        }
    }

    /// Key for the daily active-user series, e.g. `2026-08-04`.
    pub fn daily_key(&self) -> String {
        self.today_start.format("%Y-%m-%d").to_string()
    }

    /// Key for the weekly series: the date of the week's Sunday.
    pub fn weekly_key(&self) -> String {
        self.week_start.format("%Y-%m-%d").to_string()
    }

    /// Key for the monthly series, e.g. `2026-08`.
    pub fn monthly_key(&self) -> String {
        self.month_start.format("%Y-%m").to_string()
    }
}

// ---------------------------------------------------------------------------
// Input facts
// ---------------------------------------------------------------------------

/// Per-user facts needed by the aggregator.
#[derive(Debug, Clone)]
pub struct UserFacts {
    pub created_at: Timestamp,
    pub last_login_at: Option<Timestamp>,
}

/// Per-product facts, flattened out of a list.
#[derive(Debug, Clone)]
pub struct ProductFacts {
    /// Display name. Catalog-backed and free-text products with the same
    /// name collide here by design.
    pub name: String,
    pub is_purchased: bool,
    pub added_by: DbId,
}

/// Per-list facts: status plus the embedded product entries.
#[derive(Debug, Clone)]
pub struct ListFacts {
    pub status: ListStatus,
    pub products: Vec<ProductFacts>,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// One entry of a product ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCount {
    pub name: String,
    pub count: i64,
}

/// One point of an active-user time series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// Period key (`2026-08-04` daily/weekly, `2026-08` monthly).
    pub key: String,
    pub count: i64,
}

/// The full scalar/ranking output of one aggregation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsRollup {
    pub total_users: i64,
    /// Users with a login in the last 30 days.
    pub active_users: i64,
    pub new_users_this_month: i64,

    pub total_lists: i64,
    pub active_lists: i64,
    pub completed_lists: i64,
    pub archived_lists: i64,
    pub avg_lists_per_user: f64,

    pub total_products: i64,
    pub avg_products_per_list: f64,
    pub top_added_products: Vec<ProductCount>,
    pub top_purchased_products: Vec<ProductCount>,

    pub avg_contributors_per_list: f64,
    pub collaborative_lists_pct: f64,

    /// Users with a login since midnight today.
    pub daily_active_users: i64,
    /// Users with a login since the start of the week.
    pub weekly_active_users: i64,
    /// Users with a login since the start of the month.
    pub monthly_active_users: i64,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Per-name accumulator preserving first-seen order for the tie-break.
struct NameTally {
    added: i64,
    purchased: i64,
    first_seen: usize,
}

/// Run one full aggregation pass over the given snapshots.
pub fn aggregate(users: &[UserFacts], lists: &[ListFacts], bounds: &TimeBounds) -> StatsRollup {
    // --- User counters ---
    let total_users = users.len() as i64;
    let mut active_users = 0i64;
    let mut new_users_this_month = 0i64;
    let mut daily_active_users = 0i64;
    let mut weekly_active_users = 0i64;
    let mut monthly_active_users = 0i64;

    for user in users {
        if user.created_at >= bounds.month_start {
            new_users_this_month += 1;
        }
        if let Some(login) = user.last_login_at {
            if login >= bounds.thirty_days_ago {
                active_users += 1;
            }
            if login >= bounds.today_start {
                daily_active_users += 1;
            }
            if login >= bounds.week_start {
                weekly_active_users += 1;
            }
            if login >= bounds.month_start {
                monthly_active_users += 1;
            }
        }
    }

    // --- List counters + single pass over embedded products ---
    let total_lists = lists.len() as i64;
    let mut active_lists = 0i64;
    let mut completed_lists = 0i64;
    let mut archived_lists = 0i64;

    let mut total_products = 0i64;
    let mut tallies: HashMap<&str, NameTally> = HashMap::new();
    let mut next_seen = 0usize;

    let mut contributor_sum = 0i64;
    let mut collaborative_lists = 0i64;

    for list in lists {
        match list.status {
            ListStatus::Active => active_lists += 1,
            ListStatus::Completed => completed_lists += 1,
            ListStatus::Archived => archived_lists += 1,
        }

        total_products += list.products.len() as i64;

        let mut contributors: Vec<DbId> = Vec::new();
        for product in &list.products {
            let tally = tallies.entry(product.name.as_str()).or_insert_with(|| {
                let entry = NameTally {
                    added: 0,
                    purchased: 0,
                    first_seen: next_seen,
                };
                next_seen += 1;
                entry
            });
            tally.added += 1;
            if product.is_purchased {
                tally.purchased += 1;
            }

            if !contributors.contains(&product.added_by) {
                contributors.push(product.added_by);
            }
        }

        contributor_sum += contributors.len() as i64;
        if contributors.len() > 1 {
            collaborative_lists += 1;
        }
    }

    // --- Rankings ---
    let top_added_products = top_n(&tallies, |t| t.added);
    let top_purchased_products = top_n(&tallies, |t| t.purchased);

    // --- Ratio derivations (zero divisors yield 0) ---
    let avg_lists_per_user = ratio(total_lists, total_users);
    let avg_products_per_list = ratio(total_products, total_lists);
    let avg_contributors_per_list = ratio(contributor_sum, total_lists);
    let collaborative_lists_pct = 100.0 * ratio(collaborative_lists, total_lists);

    StatsRollup {
        total_users,
        active_users,
        new_users_this_month,
        total_lists,
        active_lists,
        completed_lists,
        archived_lists,
        avg_lists_per_user,
        total_products,
        avg_products_per_list,
        top_added_products,
        top_purchased_products,
        avg_contributors_per_list,
        collaborative_lists_pct,
        daily_active_users,
        weekly_active_users,
        monthly_active_users,
    }
}

/// `numerator / denominator` as f64, or 0 when the denominator is 0.
fn ratio(numerator: i64, denominator: i64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Extract the top-[`TOP_N`] names by the given counter, descending, ties
/// broken by first-seen order. Names whose counter is 0 are skipped.
fn top_n(tallies: &HashMap<&str, NameTally>, count_of: impl Fn(&NameTally) -> i64) -> Vec<ProductCount> {
    let mut entries: Vec<(&str, i64, usize)> = tallies
        .iter()
        .map(|(name, tally)| (*name, count_of(tally), tally.first_seen))
        .filter(|(_, count, _)| *count > 0)
        .collect();

    entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    entries.truncate(TOP_N);

    entries
        .into_iter()
        .map(|(name, count, _)| ProductCount {
            name: name.to_string(),
            count,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Time-series retention
// ---------------------------------------------------------------------------

/// Merge one observation into an active-user series.
///
/// The entry for `key` is replaced if already present (repeated recomputes
/// within the same period do not duplicate points), appended otherwise,
/// and the series is pruned from the front down to `max_points`.
pub fn merge_series(series: &mut Vec<SeriesPoint>, key: String, count: i64, max_points: usize) {
    match series.iter_mut().find(|p| p.key == key) {
        Some(point) => point.count = count,
        None => series.push(SeriesPoint { key, count }),
    }

    if series.len() > max_points {
        let excess = series.len() - max_points;
        series.drain(..excess);
    }
}

/// Convenience: current UTC time boundaries.
pub fn bounds_now() -> TimeBounds {
    TimeBounds::compute(Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(s: &str) -> Timestamp {
        s.parse().expect("valid RFC 3339 timestamp")
    }

    fn user(created: &str, last_login: Option<&str>) -> UserFacts {
        UserFacts {
            created_at: ts(created),
            last_login_at: last_login.map(ts),
        }
    }

    fn product(name: &str, purchased: bool, added_by: DbId) -> ProductFacts {
        ProductFacts {
            name: name.to_string(),
            is_purchased: purchased,
            added_by,
        }
    }

    /// Wednesday 2026-08-12 15:30 UTC.
    fn fixed_now() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 8, 12, 15, 30, 0).unwrap()
    }

    #[test]
    fn test_time_bounds() {
        let bounds = TimeBounds::compute(fixed_now());
        assert_eq!(bounds.today_start, ts("2026-08-12T00:00:00Z"));
        assert_eq!(bounds.month_start, ts("2026-08-01T00:00:00Z"));
        // 2026-08-12 is a Wednesday; the week's Sunday is the 9th.
        assert_eq!(bounds.week_start, ts("2026-08-09T00:00:00Z"));
        assert_eq!(bounds.thirty_days_ago, ts("2026-07-13T15:30:00Z"));

        assert_eq!(bounds.daily_key(), "2026-08-12");
        assert_eq!(bounds.weekly_key(), "2026-08-09");
        assert_eq!(bounds.monthly_key(), "2026-08");
    }

    #[test]
    fn test_week_start_on_sunday_is_today() {
        // 2026-08-09 is itself a Sunday.
        let now = Utc.with_ymd_and_hms(2026, 8, 9, 8, 0, 0).unwrap();
        let bounds = TimeBounds::compute(now);
        assert_eq!(bounds.week_start, bounds.today_start);
    }

    #[test]
    fn test_empty_corpus_yields_zeroes() {
        let rollup = aggregate(&[], &[], &TimeBounds::compute(fixed_now()));
        assert_eq!(rollup.total_users, 0);
        assert_eq!(rollup.total_lists, 0);
        assert_eq!(rollup.avg_lists_per_user, 0.0);
        assert_eq!(rollup.avg_products_per_list, 0.0);
        assert_eq!(rollup.collaborative_lists_pct, 0.0);
        assert!(rollup.top_added_products.is_empty());
    }

    #[test]
    fn test_user_counters() {
        let users = vec![
            // Active across every window.
            user("2026-08-05T10:00:00Z", Some("2026-08-12T09:00:00Z")),
            // Logged in earlier this week but not today.
            user("2026-03-01T10:00:00Z", Some("2026-08-10T09:00:00Z")),
            // Last login in July: inside 30 days, outside the month.
            user("2026-03-01T10:00:00Z", Some("2026-07-20T09:00:00Z")),
            // Dormant.
            user("2025-01-01T10:00:00Z", Some("2025-06-01T09:00:00Z")),
            // Never logged in, registered this month.
            user("2026-08-02T10:00:00Z", None),
        ];

        let rollup = aggregate(&users, &[], &TimeBounds::compute(fixed_now()));
        assert_eq!(rollup.total_users, 5);
        assert_eq!(rollup.active_users, 3);
        assert_eq!(rollup.new_users_this_month, 2);
        assert_eq!(rollup.daily_active_users, 1);
        assert_eq!(rollup.weekly_active_users, 2);
        assert_eq!(rollup.monthly_active_users, 2);
    }

    #[test]
    fn test_list_and_product_counters() {
        let users = vec![user("2026-01-01T00:00:00Z", None); 2];
        let lists = vec![
            ListFacts {
                status: ListStatus::Active,
                products: vec![
                    product("Milk", true, 1),
                    product("Bread", false, 1),
                    product("Milk", false, 2),
                ],
            },
            ListFacts {
                status: ListStatus::Completed,
                products: vec![product("Milk", true, 1)],
            },
            ListFacts {
                status: ListStatus::Archived,
                products: vec![],
            },
        ];

        let rollup = aggregate(&users, &lists, &TimeBounds::compute(fixed_now()));
        assert_eq!(rollup.total_lists, 3);
        assert_eq!(rollup.active_lists, 1);
        assert_eq!(rollup.completed_lists, 1);
        assert_eq!(rollup.archived_lists, 1);
        assert_eq!(rollup.avg_lists_per_user, 1.5);
        assert_eq!(rollup.total_products, 4);
        assert!((rollup.avg_products_per_list - 4.0 / 3.0).abs() < 1e-9);

        // Milk added 3x, purchased 2x; Bread added once, never purchased.
        assert_eq!(
            rollup.top_added_products,
            vec![
                ProductCount { name: "Milk".into(), count: 3 },
                ProductCount { name: "Bread".into(), count: 1 },
            ]
        );
        assert_eq!(
            rollup.top_purchased_products,
            vec![ProductCount { name: "Milk".into(), count: 2 }]
        );

        // Contributors: 2 + 1 + 0; only the first list is collaborative.
        assert_eq!(rollup.avg_contributors_per_list, 1.0);
        assert!((rollup.collaborative_lists_pct - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_top_n_tie_break_is_first_seen() {
        let lists = vec![ListFacts {
            status: ListStatus::Active,
            products: vec![
                product("Apples", false, 1),
                product("Bananas", false, 1),
                product("Apples", false, 1),
                product("Bananas", false, 1),
            ],
        }];

        let rollup = aggregate(&[], &lists, &TimeBounds::compute(fixed_now()));
        // Equal counts: Apples appeared first.
        assert_eq!(rollup.top_added_products[0].name, "Apples");
        assert_eq!(rollup.top_added_products[1].name, "Bananas");
    }

    #[test]
    fn test_top_n_caps_at_ten() {
        let products: Vec<ProductFacts> =
            (0..15).map(|i| product(&format!("p{i}"), false, 1)).collect();
        let lists = vec![ListFacts {
            status: ListStatus::Active,
            products,
        }];

        let rollup = aggregate(&[], &lists, &TimeBounds::compute(fixed_now()));
        assert_eq!(rollup.top_added_products.len(), 10);
    }

    #[test]
    fn test_aggregate_is_deterministic() {
        let users = vec![
            user("2026-08-05T10:00:00Z", Some("2026-08-12T09:00:00Z")),
            user("2026-03-01T10:00:00Z", None),
        ];
        let lists = vec![ListFacts {
            status: ListStatus::Active,
            products: vec![product("Milk", true, 1), product("Eggs", false, 2)],
        }];
        let bounds = TimeBounds::compute(fixed_now());

        let first = aggregate(&users, &lists, &bounds);
        let second = aggregate(&users, &lists, &bounds);
        assert_eq!(first, second);
    }

    #[test]
    fn test_merge_series_replaces_same_key() {
        let mut series = vec![SeriesPoint { key: "2026-08-11".into(), count: 4 }];

        merge_series(&mut series, "2026-08-12".into(), 7, 365);
        assert_eq!(series.len(), 2);

        // Re-running within the same day replaces, not appends.
        merge_series(&mut series, "2026-08-12".into(), 9, 365);
        assert_eq!(series.len(), 2);
        assert_eq!(series[1].count, 9);
    }

    #[test]
    fn test_merge_series_prunes_oldest() {
        let mut series: Vec<SeriesPoint> = (0..5)
            .map(|i| SeriesPoint {
                key: format!("2026-08-0{}", i + 1),
                count: i,
            })
            .collect();

        merge_series(&mut series, "2026-08-06".into(), 42, 3);
        assert_eq!(series.len(), 3);
        assert_eq!(series[0].key, "2026-08-04");
        assert_eq!(series[2].key, "2026-08-06");
    }
}
