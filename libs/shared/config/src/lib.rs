use std::env;
use tracing::warn;

pub const DEFAULT_SLOT_STEP_MINUTES: u16 = 30;
pub const DEFAULT_CONFLICT_BUFFER_MINUTES: u16 = 30;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    /// Interval between generated appointment slots.
    pub slot_step_minutes: u16,
    /// Minimum separation between two non-cancelled bookings for one doctor.
    /// Independent from the step; both default to 30.
    pub conflict_buffer_minutes: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            slot_step_minutes: parse_minutes("SLOT_STEP_MINUTES", DEFAULT_SLOT_STEP_MINUTES),
            conflict_buffer_minutes: parse_minutes(
                "CONFLICT_BUFFER_MINUTES",
                DEFAULT_CONFLICT_BUFFER_MINUTES,
            ),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_anon_key.is_empty()
    }
}

fn parse_minutes(var: &str, default: u16) -> u16 {
    match env::var(var) {
        Ok(raw) => match raw.parse::<u16>() {
            Ok(minutes) if minutes > 0 => minutes,
            _ => {
                warn!("{} has invalid value {:?}, using default {}", var, raw, default);
                default
            }
        },
        Err(_) => default,
    }
}
