use std::path::PathBuf;
use std::str::FromStr;

/// Agent driver configuration
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Ticks simulated per second
    pub tick_rate: u32,
    /// Ticks to run before stopping, 0 runs until interrupted
    pub match_ticks: u32,
    /// JSON file with game constants (built-in defaults if unset)
    pub constants_path: Option<PathBuf>,
    /// Emit debug drawing through tracing
    pub debug_draw: bool,
    /// Seed for scenario generation
    pub seed: u64,
    /// Enemy units in the generated scenario
    pub enemy_count: usize,
    /// Obstacles in the generated scenario
    pub obstacle_count: usize,
    /// Upper bound of candidate positions probed per tick
    pub candidate_count: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            tick_rate: 30,
            match_ticks: 0,
            constants_path: None,
            debug_draw: false,
            seed: 1,
            enemy_count: 8,
            obstacle_count: 40,
            candidate_count: 32,
        }
    }
}

/// Parse `raw` for `name`, keeping `current` when invalid or out of range
fn parse_or_keep<T>(name: &str, raw: Option<String>, current: T, valid: impl Fn(&T) -> bool, range: &str) -> T
where
    T: FromStr,
{
    let Some(raw) = raw else {
        return current;
    };
    match raw.parse::<T>() {
        Ok(parsed) if valid(&parsed) => parsed,
        Ok(_) => {
            tracing::warn!("{} must be {}, using default", name, range);
            current
        }
        Err(_) => {
            tracing::warn!("Invalid {} '{}', using default", name, raw);
            current
        }
    }
}

impl AgentConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load config from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        config.tick_rate = parse_or_keep("TICK_RATE", lookup("TICK_RATE"), config.tick_rate, |v| (1..=1000).contains(v), "1-1000");
        config.match_ticks = parse_or_keep("MATCH_TICKS", lookup("MATCH_TICKS"), config.match_ticks, |_| true, "a tick count");
        config.seed = parse_or_keep("SEED", lookup("SEED"), config.seed, |_| true, "an integer");
        config.enemy_count =
            parse_or_keep("ENEMY_COUNT", lookup("ENEMY_COUNT"), config.enemy_count, |v| *v <= 256, "0-256");
        config.obstacle_count = parse_or_keep(
            "OBSTACLE_COUNT",
            lookup("OBSTACLE_COUNT"),
            config.obstacle_count,
            |v| *v <= 10_000,
            "0-10000",
        );
        config.candidate_count = parse_or_keep(
            "CANDIDATE_COUNT",
            lookup("CANDIDATE_COUNT"),
            config.candidate_count,
            |v| (1..=1024).contains(v),
            "1-1024",
        );

        if let Some(debug_draw) = lookup("DEBUG_DRAW") {
            match debug_draw.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => config.debug_draw = true,
                "0" | "false" | "no" | "off" => config.debug_draw = false,
                _ => tracing::warn!("Invalid DEBUG_DRAW '{}', using default", debug_draw),
            }
        }

        if let Some(path) = lookup("CONSTANTS_PATH") {
            if !path.is_empty() {
                config.constants_path = Some(PathBuf::from(path));
            }
        }

        config
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), String> {
        if self.tick_rate == 0 {
            return Err("tick_rate must be at least 1".to_string());
        }
        if self.candidate_count == 0 {
            return Err("candidate_count must be at least 1".to_string());
        }
        if let Some(path) = &self.constants_path {
            if !path.exists() {
                return Err(format!("constants file {} does not exist", path.display()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> AgentConfig {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AgentConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = AgentConfig::default();
        assert_eq!(config.tick_rate, 30);
        assert_eq!(config.match_ticks, 0);
        assert!(!config.debug_draw);
        assert!(config.constants_path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_reads_variables() {
        let config = config_from(&[
            ("TICK_RATE", "60"),
            ("MATCH_TICKS", "900"),
            ("DEBUG_DRAW", "true"),
            ("SEED", "42"),
            ("ENEMY_COUNT", "3"),
            ("CANDIDATE_COUNT", "12"),
        ]);
        assert_eq!(config.tick_rate, 60);
        assert_eq!(config.match_ticks, 900);
        assert!(config.debug_draw);
        assert_eq!(config.seed, 42);
        assert_eq!(config.enemy_count, 3);
        assert_eq!(config.candidate_count, 12);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_from(&[
            ("TICK_RATE", "0"),
            ("SEED", "abc"),
            ("CANDIDATE_COUNT", "-4"),
            ("DEBUG_DRAW", "maybe"),
        ]);
        let defaults = AgentConfig::default();
        assert_eq!(config.tick_rate, defaults.tick_rate);
        assert_eq!(config.seed, defaults.seed);
        assert_eq!(config.candidate_count, defaults.candidate_count);
        assert_eq!(config.debug_draw, defaults.debug_draw);
    }

    #[test]
    fn test_missing_constants_file_fails_validation() {
        let config = config_from(&[("CONSTANTS_PATH", "/definitely/not/here.json")]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_or_default() {
        let config = AgentConfig::load_or_default();
        assert!(config.tick_rate > 0);
    }
}
