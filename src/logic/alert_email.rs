use crate::models::{ForecastWindow, UserPreference, WindReading};
use chrono::{DateTime, FixedOffset};

#[derive(Debug, Clone, PartialEq)]
pub struct AlertMessage {
    pub subject: String,
    pub body: String,
}

/// Static parts of every alert.
#[derive(Debug, Clone)]
pub struct MessageContext {
    pub timezone_label: String,
    pub account_url: String,
}

pub fn format_alert(
    user: &UserPreference,
    window: &ForecastWindow,
    wind: &WindReading,
    rationale: &str,
    generated_at: DateTime<FixedOffset>,
    ctx: &MessageContext,
) -> AlertMessage {
    let beach = &user.beach_name;
    let subject = format!(
        "🏄 Surf's On! {} - Good conditions at {}",
        beach,
        window.time.format("%H:%M")
    );

    let mut body = String::new();
    body.push_str("OUT THERE! SURF CONDITIONS ARE MET!\n");
    body.push_str(&"=".repeat(40));
    body.push_str("\n\n");
    body.push_str(&format!("Location: {}\n", beach));
    body.push_str(&format!(
        "Time: {}\n\n",
        window.time.format("%A %d %B %Y at %H:%M")
    ));
    body.push_str("CONDITIONS:\n-----------\n");
    body.push_str(&format!(
        "Swell Height: {:.1}m ✓\n  (Your range: {:.1}m – {:.1}m)\n\n",
        window.swell_m, user.min_swell, user.max_swell
    ));
    body.push_str(&format!(
        "Tide Height: {:.2}m ✓\n  (Your range: {:.1}m – {:.1}m)\n\n",
        window.tide_m, user.min_tide, user.max_tide
    ));
    body.push_str(&format!(
        "Wind: {} from {}\n",
        wind.speed_text(),
        wind.direction_text()
    ));
    if let Some(gust) = wind.gust_kmh {
        body.push_str(&format!("  Gusts: {} km/h\n", gust));
    }
    body.push_str(&format!("  {} ✓\n\n", rationale));
    body.push_str(&format!("Wind Source: {}\n\n", wind.source));
    body.push_str("---\n");
    body.push_str(&format!(
        "Generated: {} {}\n\n",
        generated_at.format("%Y-%m-%d %H:%M:%S"),
        ctx.timezone_label
    ));
    body.push_str(&format!("Update your settings: {}\n\n", ctx.account_url));
    body.push_str("This is an automated message. Please do not reply to this email.\n");

    AlertMessage { subject, body }
}
