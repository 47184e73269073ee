use ibops_core::aggregate::ComparisonResult;
use ibops_core::diagnostics::Diagnostics;
use ibops_core::pipelines::air_ground::{AirGroundReport, CartSection};
use ibops_core::pipelines::hours::{HoursComparison, HoursReport};
use ibops_core::pipelines::ppa::{PpaReport, VolumeSection};
use ibops_core::pipelines::snapshot::{LaborSection, SnapshotReport, TransactionSection};
use rust_decimal::Decimal;

fn print_diagnostics(diagnostics: &Diagnostics) {
    if diagnostics.is_clean() {
        return;
    }
    println!("  Diagnostics: {}", diagnostics.summary());
    println!();
}

fn pct(value: Decimal) -> String {
    format!("{:.1}%", value)
}

pub fn print_ppa(report: &PpaReport) {
    println!("=== {} ===\n", report.ruleset);
    println!("  Rows read: {}", report.rows_read);
    println!("  Unique LPs: {}\n", report.total_unique);

    let width = report
        .categories
        .iter()
        .map(|c| c.label.len())
        .max()
        .unwrap_or(10);
    for cat in &report.categories {
        println!(
            "  {:<width$}  {:>6}  {:>7}",
            cat.label,
            cat.count,
            pct(cat.share_pct),
            width = width
        );
    }
    println!();

    match &report.volume {
        VolumeSection::Available(v) => {
            println!(
                "  Small-volume {} moves: {} of {} candidates ({})",
                v.movement,
                v.eligible_count(),
                v.candidates,
                pct(v.small_volume_pct)
            );
            if v.excluded_rows > 0 {
                println!("  Excluded (already in cart): {}", v.excluded_rows);
            }
            if !v.eligible.is_empty() {
                println!();
                println!(
                    "    {:<14} {:<10} {:>8} {:>10} {:>10}  Location",
                    "LP", "Item", "Qty", "Cube", "Total"
                );
                for row in &v.eligible {
                    println!(
                        "    {:<14} {:<10} {:>8} {:>10} {:>10.2}  {}",
                        row.identifier,
                        row.item,
                        row.quantity,
                        row.cubic_volume,
                        row.total_volume,
                        row.location
                    );
                }
            }
        }
        VolumeSection::Unavailable { reason } => {
            println!("  Volume analysis unavailable: {}", reason);
        }
    }
    println!();
    print_diagnostics(&report.diagnostics);
}

pub fn print_air_ground(report: &AirGroundReport) {
    let m = &report.metrics;
    println!("=== {} ===\n", report.ruleset);
    if let (Some(first), Some(last)) = (report.first_date, report.last_date) {
        println!("  Period: {} to {}", first, last);
    }
    println!("  Transactions: {}", m.total);
    println!(
        "  Air:    {:>6}  {:>7}  avg {:.2} min",
        m.air_count,
        pct(m.air_pct),
        m.avg_air_minutes
    );
    println!(
        "  Ground: {:>6}  {:>7}  avg {:.2} min",
        m.ground_count,
        pct(m.ground_pct),
        m.avg_ground_minutes
    );
    println!("  MOD-format moves: {}\n", m.mod_transactions);

    match &report.cart {
        CartSection::Available(cart) => {
            if let Some(c) = &m.cart {
                println!(
                    "  Cart-size moves: {} (to air {}, to ground {}, {} air)",
                    c.small_volume_total,
                    c.cart_to_air,
                    c.cart_to_ground,
                    pct(c.cart_air_pct)
                );
            }
            for bucket in &cart.volume_distribution {
                println!("    {:<10} {:>6}", bucket.range, bucket.count);
            }
            if !cart.employees.is_empty() {
                println!("\n    {:<16} {:>6} {:>6}", "Employee", "Air", "Ground");
                for e in &cart.employees {
                    println!("    {:<16} {:>6} {:>6}", e.employee, e.air, e.ground);
                }
            }
            if !cart.top_items.is_empty() {
                let items: Vec<String> = cart
                    .top_items
                    .iter()
                    .map(|i| format!("{} ({})", i.item, i.count))
                    .collect();
                println!("\n    Top items: {}", items.join(", "));
            }
        }
        CartSection::Unavailable { reason } => {
            println!("  Cart analysis unavailable: {}", reason);
        }
    }
    println!();

    if !report.daily.days.is_empty() {
        println!("  {:<12} {:>6} {:>6} {:>7}", "Date", "Air", "Ground", "Air %");
        for day in &report.daily.days {
            println!(
                "  {:<12} {:>6} {:>6} {:>7}",
                day.date.to_string(),
                day.air,
                day.ground,
                pct(day.air_pct)
            );
        }
        if report.daily.undated_rows > 0 {
            println!("  Undated rows: {}", report.daily.undated_rows);
        }
        println!();
    }
    print_diagnostics(&report.diagnostics);
}

pub fn print_air_ground_comparison(result: &ComparisonResult<AirGroundReport>) {
    println!("=== Period comparison ===\n");
    println!(
        "  {:<20} {:>12} {:>12} {:>10}",
        "Metric", "Baseline", "Current", "Change"
    );
    for (name, change) in &result.changes {
        println!(
            "  {:<20} {:>12.2} {:>12.2} {:>10}",
            name,
            change.baseline,
            change.current,
            change.change.to_string()
        );
    }
    println!();
}

pub fn print_hours(report: &HoursReport) {
    let b = &report.breakdown;
    println!("=== {} ===\n", b.map_name);
    println!("  Total inbound hours: {:.2}\n", report.inbound_hours);
    for cat in &b.categories {
        println!(
            "  {:<24} {:>9.2} h  {:>7}",
            cat.name,
            cat.hours,
            pct(cat.share_pct)
        );
    }
    println!();
    println!("  Coverage: {} of {:.2} listed hours", pct(b.coverage_pct), report.listed_hours);
    if !b.uncategorized.is_empty() {
        println!("  Uncategorized functions:");
        for f in &b.uncategorized {
            println!("    {:<32} {:>9.2} h", f.name, f.hours);
        }
    }
    if !report.skipped_lines.is_empty() {
        println!("  Skipped lines: {}", report.skipped_lines.len());
    }
    println!();
}

pub fn print_hours_comparison(cmp: &HoursComparison) {
    println!("=== Hours comparison ===\n");
    println!(
        "  Baseline: {:.2} h   Current: {:.2} h   ({})\n",
        cmp.shares.baseline_hours,
        cmp.shares.current_hours,
        cmp.shares.hours_change
    );
    println!(
        "  {:<24} {:>9} {:>9} {:>9}  Direction",
        "Bucket", "Baseline", "Current", "Diff"
    );
    for s in &cmp.shares.shifts {
        println!(
            "  {:<24} {:>9} {:>9} {:>+9.1}  {:?}",
            s.category,
            pct(s.baseline_pct),
            pct(s.current_pct),
            s.diff_points,
            s.direction
        );
    }
    println!();
}

pub fn print_snapshot(report: &SnapshotReport) {
    println!("=== Inbound snapshot ===\n");

    if let Some(TransactionSection::InsufficientData { reason }) = &report.transactions {
        println!("  Transactions: insufficient data ({reason})\n");
    }
    if let Some(tx) = report.transactions.as_ref().and_then(TransactionSection::kpis) {
        println!("  Transactions: {} rows", tx.total_rows);
        println!(
            "  Type 152: {} puts, {} units, UPT {:.2} ({} of rows)",
            tx.put_transactions,
            tx.put_volume,
            tx.put_upt,
            pct(tx.put_share_pct)
        );
        println!("  Type 151: {} receipts", tx.receipt_transactions);
        if let Some(b) = &report.balance {
            let status = if b.balanced { "balanced" } else { "imbalanced" };
            println!("  Receipt/put ratio: {:.2} ({})", b.ratio, status);
        }
        println!();
    }

    match &report.labor {
        Some(LaborSection::Available(labor)) => {
            let d = &labor.department;
            println!(
                "  {}: {:.2} h, {} units, UPH {:.1}, TPH {:.1}",
                d.name, d.hours, d.units, d.uph, d.tph
            );
            let b = &labor.breakdown;
            println!(
                "  Direct {:.2} h ({}), indirect {:.2} h ({}), coverage {}",
                b.direct_hours,
                pct(b.direct_pct),
                b.indirect_hours,
                pct(b.indirect_pct),
                pct(b.coverage_pct)
            );
            println!(
                "  Direct UPH {:.1}, direct TPH {:.1}, indirect:direct {:.2}",
                b.direct_uph, b.direct_tph, b.indirect_to_direct
            );
            if !b.returns_hours.is_zero() {
                println!("  Customer returns: {:.2} h, TPH {:.1}", b.returns_hours, b.returns_tph);
            }
            for area in &labor.areas {
                println!(
                    "    {:<28} {:>8.2} h  {:>7}  UPH {:.1}",
                    area.area.row.name,
                    area.area.row.hours,
                    pct(area.hours_pct),
                    area.area.row.uph
                );
            }
            println!();
        }
        Some(LaborSection::InsufficientData { reason }) => {
            println!("  Labor KPIs unavailable: {}\n", reason);
        }
        None => {}
    }

    if let Some(c) = &report.combined {
        println!(
            "  TPH {:.1}   TPLH {:.2}   UPT {:.2}",
            c.tph, c.tplh, c.upt
        );
        if let Some(v) = c.efficiency_variance_pct {
            println!("  Variance vs labor TPH: {:+.1}%", v);
        }
        println!();
    }

    if let Some(vas) = &report.vas {
        println!(
            "  VAS: {} units in {:.2} h, UPH {:.1} vs suggested {:.1} ({}, {:?})",
            vas.total_units,
            vas.total_hours,
            vas.actual_uph,
            vas.suggested_uph,
            pct(vas.performance_pct),
            vas.indicator
        );
        for task in &vas.tasks {
            let target = task
                .target_uph
                .map(|t| t.to_string())
                .unwrap_or_else(|| "-".into());
            println!(
                "    {:<16} {:>8} units {:>8.2} h  UPH {:>7.1}  target {:>5}",
                task.location, task.units, task.hours, task.actual_uph, target
            );
        }
        println!();
    }

    if let Some(cart) = &report.cart {
        println!(
            "  CART: {} moves, TPLH {:.2} vs target {} ({})",
            cart.total_transactions,
            cart.tplh,
            cart.target_tplh,
            pct(cart.performance_pct)
        );
        for u in &cart.users {
            println!(
                "    {:<16} {:>5} moves {:>7.2} h  TPLH {:>6.2}",
                u.user, u.transactions, u.hours, u.tplh
            );
        }
        println!();
    }

    let a = &report.assessment;
    if !a.insights.is_empty() {
        println!("  Insights:");
        for i in &a.insights {
            println!("    [{:?}] {}: {}", i.kind, i.title, i.message);
            if let Some(r) = &i.recommendation {
                println!("      {}", r);
            }
        }
        println!();
    }
    for anomaly in &a.anomalies {
        println!("  Anomaly: {} = {:.2} ({})", anomaly.metric, anomaly.value, anomaly.message);
    }
    print_diagnostics(&report.diagnostics);
}
