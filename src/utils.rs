/// Format a peso amount with a B/M suffix, e.g. `Php 1.50B`, `Php 200M`, `Php 12,345`
pub fn format_currency(amount: u64) -> String {
    if amount >= 1_000_000_000 {
        format!("Php {:.2}B", amount as f64 / 1e9)
    } else if amount >= 1_000_000 {
        format!("Php {:.0}M", amount as f64 / 1e6)
    } else {
        format!("Php {}", group_thousands(amount))
    }
}

fn group_thousands(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
