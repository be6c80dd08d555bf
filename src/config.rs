use directories::ProjectDirs;
use rust_decimal::Decimal;

/// Bounds and default for an integer percentage slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PercentRange {
    pub min: u32,
    pub max: u32,
    pub default: u32,
}

impl PercentRange {
    pub fn clamp(self, value: i64) -> u32 {
        let clamped = value.clamp(i64::from(self.min), i64::from(self.max));
        u32::try_from(clamped).unwrap_or(self.min)
    }

    pub fn to_decimal(self, value: u32) -> Decimal {
        Decimal::from(self.clamp(i64::from(value)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub window_title: String,
    pub currency_symbol: String,
    pub export_file_name: String,
    pub markup: PercentRange,
    pub waste: PercentRange,
    pub log_filter: String,
    pub qualifier: &'static str,
    pub organization: &'static str,
    pub application: &'static str,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            window_title: "Mechanical Estimation Dashboard".to_string(),
            currency_symbol: "€".to_string(),
            export_file_name: "adjusted_BOM.csv".to_string(),
            markup: PercentRange {
                min: 0,
                max: 50,
                default: 10,
            },
            waste: PercentRange {
                min: 0,
                max: 20,
                default: 0,
            },
            log_filter: "bom_estimator=info".to_string(),
            qualifier: "com",
            organization: "hellhbbd",
            application: "bom-estimator",
        }
    }
}

impl DashboardConfig {
    pub fn project_dirs(&self) -> Option<ProjectDirs> {
        ProjectDirs::from(self.qualifier, self.organization, self.application)
    }
}
