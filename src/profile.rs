//! Assembles the six-layer profile from the numerology, cycle and
//! celestial parts.

use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::ephemeris::{AnalyticEphemeris, CelestialLookup, CelestialReading};
use crate::numerology::LifePathNumber;
use crate::pinnacles::{PinnacleCycle, PlanetaryCycles};
use crate::temporal::{normalize, UniversalInstant};
use crate::{BirthRecord, EngineConfig, ProfileError};

pub const PROFILE_VERSION: &str = "Solalendar Tier1 v4.1";
pub const PROFILE_TYPE: &str = "PSC_Decode";

/// The evaluation-time facts an analysis depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisContext {
    pub current_year: i32,
}

impl AnalysisContext {
    /// Reads the local clock once.
    pub fn now() -> Self {
        AnalysisContext { current_year: Local::now().year() }
    }

    pub fn for_year(current_year: i32) -> Self {
        AnalysisContext { current_year }
    }

    /// Whole years by calendar year only; negative for future births.
    pub fn age_of(&self, birth: &BirthRecord) -> i32 {
        self.current_year - birth.year()
    }
}

// ---------------------------
// ## Layers
// ---------------------------

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LayerKind {
    Kernel,
    Bios,
    Infra,
    Env,
    Runtime,
    Skin,
}

impl LayerKind {
    pub const ALL: [LayerKind; 6] = [
        LayerKind::Kernel,
        LayerKind::Bios,
        LayerKind::Infra,
        LayerKind::Env,
        LayerKind::Runtime,
        LayerKind::Skin,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Field name of the layer in the serialized profile.
    pub fn key(&self) -> &'static str {
        match self {
            LayerKind::Kernel => "layer_0_kernel",
            LayerKind::Bios => "layer_1_bios",
            LayerKind::Infra => "layer_2_infra",
            LayerKind::Env => "layer_3_env",
            LayerKind::Runtime => "layer_4_runtime",
            LayerKind::Skin => "layer_5_skin",
        }
    }

    fn default_desc(&self) -> &'static str {
        match self {
            LayerKind::Kernel => "The Absolute",
            LayerKind::Bios => "Source Numerology",
            LayerKind::Infra => "Social Cycles & Chapters",
            LayerKind::Env => "Display Environment",
            LayerKind::Runtime => "System Clock",
            LayerKind::Skin => "Interface",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    pub version: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KernelLayer {
    pub desc: String,
    pub jdn: f64,
    pub vector: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiosLayer {
    pub desc: String,
    pub lpn: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinnacleSummary {
    pub current_number: u32,
    pub current_stage: String,
    pub period_range: String,
    pub all_pins: [u32; 4],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cycles {
    pub saturn_cycle: String,
    pub jupiter_phase: String,
    pub pinnacle: PinnacleSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfraLayer {
    pub desc: String,
    pub cycles: Cycles,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvLayer {
    pub desc: String,
    pub sun_sign: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeLayer {
    pub desc: String,
    pub moon_sign: String,
    pub eastern_root: String,
    pub texture: String,
    pub lunar_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkinLayer {
    pub desc: String,
    pub ascendant: String,
}

/// One complete analysis result. Built once per call and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub meta: Meta,
    pub layer_0_kernel: KernelLayer,
    pub layer_1_bios: BiosLayer,
    pub layer_2_infra: InfraLayer,
    pub layer_3_env: EnvLayer,
    pub layer_4_runtime: RuntimeLayer,
    pub layer_5_skin: SkinLayer,
}

impl Profile {
    pub fn description(&self, kind: LayerKind) -> &str {
        match kind {
            LayerKind::Kernel => &self.layer_0_kernel.desc,
            LayerKind::Bios => &self.layer_1_bios.desc,
            LayerKind::Infra => &self.layer_2_infra.desc,
            LayerKind::Env => &self.layer_3_env.desc,
            LayerKind::Runtime => &self.layer_4_runtime.desc,
            LayerKind::Skin => &self.layer_5_skin.desc,
        }
    }

    fn assemble(
        birth: &BirthRecord,
        instant: &UniversalInstant,
        life_path: LifePathNumber,
        cycles: &PlanetaryCycles,
        pinnacles: &PinnacleCycle,
        reading: &CelestialReading,
    ) -> Self {
        let desc = |kind: LayerKind| kind.default_desc().to_string();
        let current = pinnacles.current();

        Profile {
            meta: Meta {
                version: PROFILE_VERSION.to_string(),
                kind: PROFILE_TYPE.to_string(),
            },
            layer_0_kernel: KernelLayer {
                desc: desc(LayerKind::Kernel),
                jdn: instant.day_count,
                vector: birth.location().vector(),
            },
            layer_1_bios: BiosLayer {
                desc: desc(LayerKind::Bios),
                lpn: life_path.value(),
            },
            layer_2_infra: InfraLayer {
                desc: desc(LayerKind::Infra),
                cycles: Cycles {
                    saturn_cycle: cycles.saturn_label(),
                    jupiter_phase: cycles.jupiter_label(),
                    pinnacle: PinnacleSummary {
                        current_number: current.number,
                        current_stage: current.stage_name().to_string(),
                        period_range: current.period_range(),
                        all_pins: pinnacles.numbers(),
                    },
                },
            },
            layer_3_env: EnvLayer {
                desc: desc(LayerKind::Env),
                sun_sign: reading.sun.sign.to_string(),
            },
            layer_4_runtime: RuntimeLayer {
                desc: desc(LayerKind::Runtime),
                moon_sign: reading.moon.sign.to_string(),
                eastern_root: reading.day_stem_branch.to_string(),
                texture: reading.day_texture.to_string(),
                lunar_date: reading.lunar_date.to_string(),
            },
            layer_5_skin: SkinLayer {
                desc: desc(LayerKind::Skin),
                ascendant: reading.ascendant.sign.to_string(),
            },
        }
    }
}

// ---------------------------
// ## Engine
// ---------------------------

pub struct FateEngine<L> {
    lookup: L,
    config: EngineConfig,
}

impl FateEngine<AnalyticEphemeris> {
    pub fn analytic(config: EngineConfig) -> Self {
        FateEngine::new(AnalyticEphemeris, config)
    }
}

impl<L: CelestialLookup> FateEngine<L> {
    pub fn new(lookup: L, config: EngineConfig) -> Self {
        FateEngine { lookup, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn analyze(&self, birth: &BirthRecord, context: &AnalysisContext) -> Result<Profile, ProfileError> {
        let instant = normalize(birth, self.config.day_count, self.config.reference_offset_hours)?;

        // Year, month and day are validated positive, so the casts are lossless.
        let (year, month, day) = (birth.year() as u32, birth.month(), birth.day());
        let life_path = LifePathNumber::from_date(year, month, day);
        let age = context.age_of(birth);
        let cycles = PlanetaryCycles::for_age(age);
        let pinnacles = PinnacleCycle::compute(year, month, day, life_path, age);
        debug!(
            lpn = life_path.value(),
            age,
            chapter = pinnacles.current().ordinal,
            "numerology layers computed"
        );

        let reading = self.lookup.lookup(birth)?;

        let profile = Profile::assemble(birth, &instant, life_path, &cycles, &pinnacles, &reading);
        info!(name = birth.name(), civil = %birth.civil(), "profile assembled");
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeris::LookupError;
    use crate::{CivilDateTime, DayCountMode, Location};
    use approx::assert_relative_eq;

    fn tokyo_1974() -> BirthRecord {
        BirthRecord::new(
            "Test",
            CivilDateTime::new(1974, 11, 4, 7, 0),
            Location::tokyo(),
            "Asia/Tokyo",
        )
        .unwrap()
    }

    fn analyze_1974() -> Profile {
        FateEngine::analytic(EngineConfig::default())
            .analyze(&tokyo_1974(), &AnalysisContext::for_year(2024))
            .unwrap()
    }

    struct Offline;

    impl CelestialLookup for Offline {
        fn lookup(&self, _birth: &BirthRecord) -> Result<CelestialReading, LookupError> {
            Err(LookupError::Unavailable("offline".to_string()))
        }
    }

    #[test]
    fn test_profile_for_tokyo_1974() {
        let profile = analyze_1974();
        assert_eq!(profile.meta.version, "Solalendar Tier1 v4.1");
        assert_eq!(profile.meta.kind, "PSC_Decode");

        assert_relative_eq!(profile.layer_0_kernel.jdn, 2442355.4166666665, epsilon = 1e-9);
        assert_eq!(profile.layer_0_kernel.vector, "35.6895, 139.6917");
        assert_eq!(profile.layer_1_bios.lpn, 9);

        let cycles = &profile.layer_2_infra.cycles;
        assert_eq!(cycles.saturn_cycle, "Round 2");
        assert_eq!(cycles.jupiter_phase, "Year 2/12");
        assert_eq!(cycles.pinnacle.current_number, 5);
        assert_eq!(cycles.pinnacle.current_stage, "4th Pinnacle (Integration)");
        assert_eq!(cycles.pinnacle.period_range, "Age 46+");
        assert_eq!(cycles.pinnacle.all_pins, [6, 7, 4, 5]);

        assert_eq!(profile.layer_3_env.sun_sign, "Scorpio");
        assert_eq!(profile.layer_4_runtime.moon_sign, "Gemini");
        assert_eq!(profile.layer_4_runtime.eastern_root, "己酉");
        assert_eq!(profile.layer_4_runtime.texture, "大驿土");
        assert_eq!(profile.layer_4_runtime.lunar_date, "9月21日");
        assert_eq!(profile.layer_5_skin.ascendant, "Scorpio");
    }

    #[test]
    fn test_profile_json_shape() {
        let value = serde_json::to_value(analyze_1974()).unwrap();
        assert_eq!(value["meta"]["type"], "PSC_Decode");
        for kind in LayerKind::ALL {
            assert!(value[kind.key()]["desc"].is_string(), "{}", kind.key());
        }
        assert_eq!(value["layer_2_infra"]["cycles"]["pinnacle"]["all_pins"], serde_json::json!([6, 7, 4, 5]));
        assert_eq!(value["layer_4_runtime"]["eastern_root"], "己酉");
        assert_eq!(value.as_object().unwrap().len(), 7);
    }

    #[test]
    fn test_layer_descriptions_in_order() {
        let profile = analyze_1974();
        let descs: Vec<&str> = LayerKind::ALL.iter().map(|kind| profile.description(*kind)).collect();
        assert_eq!(
            descs,
            [
                "The Absolute",
                "Source Numerology",
                "Social Cycles & Chapters",
                "Display Environment",
                "System Clock",
                "Interface",
            ]
        );
        assert_eq!(LayerKind::Skin.index(), 5);
    }

    #[test]
    fn test_analysis_is_repeatable() {
        assert_eq!(analyze_1974(), analyze_1974());
    }

    #[test]
    fn test_lookup_failure_is_reported() {
        let engine = FateEngine::new(Offline, EngineConfig::default());
        let err = engine
            .analyze(&tokyo_1974(), &AnalysisContext::for_year(2024))
            .unwrap_err();
        assert!(matches!(err, ProfileError::Lookup(LookupError::Unavailable(_))));
    }

    #[test]
    fn test_resolved_day_count_mode() {
        let config = EngineConfig { day_count: DayCountMode::Resolved, ..EngineConfig::default() };
        let birth = BirthRecord::new(
            "Test",
            CivilDateTime::new(2000, 1, 1, 12, 0),
            Location::greenwich(),
            "Europe/London",
        )
        .unwrap();
        let profile = FateEngine::analytic(config)
            .analyze(&birth, &AnalysisContext::for_year(2024))
            .unwrap();
        assert_relative_eq!(profile.layer_0_kernel.jdn, 2451545.0);
    }

    #[test]
    fn test_future_birth_yields_negative_age_labels() {
        let profile = FateEngine::analytic(EngineConfig::default())
            .analyze(&tokyo_1974(), &AnalysisContext::for_year(1970))
            .unwrap();
        let cycles = &profile.layer_2_infra.cycles;
        assert_eq!(cycles.saturn_cycle, "Round 0");
        assert_eq!(cycles.jupiter_phase, "Year 8/12");
        assert_eq!(cycles.pinnacle.current_stage, "1st Pinnacle (Formation)");
    }

    #[test]
    fn test_age_of() {
        assert_eq!(AnalysisContext::for_year(2024).age_of(&tokyo_1974()), 50);
    }
}
