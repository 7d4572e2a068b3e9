pub mod time;

/// Format a whole-rupee quote for log output
pub fn format_rupees(price: u64) -> String {
    format!("Rs {}", price)
}
