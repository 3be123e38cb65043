// file: `src/energy.rs`
use crate::error::{McError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Registered pair potentials, keyed by their configuration token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelKind {
    #[serde(rename = "LJ")]
    LennardJones,
    #[serde(rename = "Buckingham")]
    Buckingham,
    #[serde(rename = "UnitlessLJ")]
    UnitlessLennardJones,
}

impl ModelKind {
    pub const ALL: [ModelKind; 3] = [
        ModelKind::LennardJones,
        ModelKind::Buckingham,
        ModelKind::UnitlessLennardJones,
    ];

    /// Token used on the command line and in YAML files
    pub fn token(&self) -> &'static str {
        match self {
            ModelKind::LennardJones => "LJ",
            ModelKind::Buckingham => "Buckingham",
            ModelKind::UnitlessLennardJones => "UnitlessLJ",
        }
    }
}

impl FromStr for ModelKind {
    type Err = McError;

    fn from_str(s: &str) -> Result<Self> {
        ModelKind::ALL
            .into_iter()
            .find(|kind| kind.token().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| McError::UnknownModel(s.to_string()))
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A raw model parameter as it arrives from YAML or the command line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Text(String),
}

impl ParamValue {
    /// The value as a finite float, if it is one
    pub fn as_finite(&self) -> Option<f64> {
        let value = match self {
            ParamValue::Number(x) => *x,
            ParamValue::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Number(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Number(x) => write!(f, "{}", x),
            ParamValue::Text(s) => write!(f, "{:?}", s),
        }
    }
}

pub type ModelParams = BTreeMap<String, ParamValue>;

/// Pairwise potential as a function of the scalar separation `r`.
///
/// At `r == 0` the Lennard-Jones variants evaluate to NaN (`inf - inf`) and
/// Buckingham to `-inf` for `c > 0`. No clamping is applied; the sampler
/// treats any non-finite particle energy as a fatal numeric fault.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnergyModel {
    /// `4ε[(σ/r)^12 - (σ/r)^6]`
    LennardJones { epsilon: f64, sigma: f64 },
    /// `a·exp(-r/ρ) - c/r^6`
    Buckingham { rho: f64, a: f64, c: f64 },
    /// Lennard-Jones with σ = ε = 1
    UnitlessLennardJones,
}

pub const DEFAULT_LJ_EPSILON: f64 = 0.5;
pub const DEFAULT_LJ_SIGMA: f64 = 1.0;
pub const DEFAULT_BUCKINGHAM_RHO: f64 = 1.0;
pub const DEFAULT_BUCKINGHAM_A: f64 = 1.0;
pub const DEFAULT_BUCKINGHAM_C: f64 = 1.0;

impl EnergyModel {
    /// Lennard-Jones with explicit parameters; non-finite values fall back to defaults
    pub fn lennard_jones(epsilon: f64, sigma: f64) -> Self {
        EnergyModel::LennardJones {
            epsilon: coerce_finite("LJ", "epsilon", epsilon, DEFAULT_LJ_EPSILON),
            sigma: coerce_finite("LJ", "sigma", sigma, DEFAULT_LJ_SIGMA),
        }
    }

    pub fn buckingham(rho: f64, a: f64, c: f64) -> Self {
        EnergyModel::Buckingham {
            rho: coerce_finite("Buckingham", "rho", rho, DEFAULT_BUCKINGHAM_RHO),
            a: coerce_finite("Buckingham", "a", a, DEFAULT_BUCKINGHAM_A),
            c: coerce_finite("Buckingham", "c", c, DEFAULT_BUCKINGHAM_C),
        }
    }

    pub fn unitless() -> Self {
        EnergyModel::UnitlessLennardJones
    }

    /// Build a model from its token and a set of named parameters.
    ///
    /// Missing parameters take the variant's default. Malformed ones are
    /// logged and replaced by the default; only the token itself can fail.
    pub fn from_name(name: &str, params: &ModelParams) -> Result<Self> {
        let kind: ModelKind = name.parse()?;
        Ok(Self::from_kind(kind, params))
    }

    pub fn from_kind(kind: ModelKind, params: &ModelParams) -> Self {
        let known: &[&str] = match kind {
            ModelKind::LennardJones => &["epsilon", "sigma"],
            ModelKind::Buckingham => &["rho", "a", "c"],
            ModelKind::UnitlessLennardJones => &[],
        };
        for key in params.keys().filter(|k| !known.contains(&k.as_str())) {
            warn!("Ignoring parameter '{}' for energy model {}", key, kind);
        }

        let token = kind.token();
        match kind {
            ModelKind::LennardJones => EnergyModel::LennardJones {
                epsilon: lookup(token, params, "epsilon", DEFAULT_LJ_EPSILON),
                sigma: lookup(token, params, "sigma", DEFAULT_LJ_SIGMA),
            },
            ModelKind::Buckingham => EnergyModel::Buckingham {
                rho: lookup(token, params, "rho", DEFAULT_BUCKINGHAM_RHO),
                a: lookup(token, params, "a", DEFAULT_BUCKINGHAM_A),
                c: lookup(token, params, "c", DEFAULT_BUCKINGHAM_C),
            },
            ModelKind::UnitlessLennardJones => EnergyModel::UnitlessLennardJones,
        }
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            EnergyModel::LennardJones { .. } => ModelKind::LennardJones,
            EnergyModel::Buckingham { .. } => ModelKind::Buckingham,
            EnergyModel::UnitlessLennardJones => ModelKind::UnitlessLennardJones,
        }
    }

    /// Pair energy at separation `r`
    #[inline]
    pub fn calc_energy(&self, r: f64) -> f64 {
        match *self {
            EnergyModel::LennardJones { epsilon, sigma } => {
                let sr6 = (sigma / r).powi(6);
                4.0 * epsilon * (sr6 * sr6 - sr6)
            }
            EnergyModel::Buckingham { rho, a, c } => a * (-r / rho).exp() - c / r.powi(6),
            EnergyModel::UnitlessLennardJones => {
                let inv_r6 = (1.0 / r).powi(6);
                4.0 * (inv_r6 * inv_r6 - inv_r6)
            }
        }
    }

    /// Energy contribution of pairs beyond `cutoff`, assuming a uniform
    /// pair distribution in a cubic box of side `box_length`.
    ///
    /// Only the unitless variant carries an analytic tail; the other two
    /// return zero.
    pub fn cutoff_correction(&self, cutoff: f64, n_particles: usize, box_length: f64) -> f64 {
        match self {
            EnergyModel::LennardJones { .. } | EnergyModel::Buckingham { .. } => 0.0,
            EnergyModel::UnitlessLennardJones => {
                let n = n_particles as f64;
                let volume = box_length.powi(3);
                let sig_by_cutoff3 = (1.0 / cutoff).powi(3);
                let sig_by_cutoff9 = sig_by_cutoff3.powi(3);
                let correction = sig_by_cutoff9 - 3.0 * sig_by_cutoff3;
                correction * (8.0 / 9.0 * PI * n / volume * n)
            }
        }
    }
}

impl fmt::Display for EnergyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnergyModel::LennardJones { epsilon, sigma } => {
                write!(f, "LJ(epsilon={}, sigma={})", epsilon, sigma)
            }
            EnergyModel::Buckingham { rho, a, c } => {
                write!(f, "Buckingham(rho={}, a={}, c={})", rho, a, c)
            }
            EnergyModel::UnitlessLennardJones => write!(f, "UnitlessLJ"),
        }
    }
}

fn lookup(model: &str, params: &ModelParams, name: &str, default: f64) -> f64 {
    match params.get(name) {
        None => default,
        Some(raw) => raw.as_finite().unwrap_or_else(|| {
            warn!(
                "Invalid value {} for {} parameter '{}', using default {}",
                raw, model, name, default
            );
            default
        }),
    }
}

fn coerce_finite(model: &str, name: &str, value: f64, default: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        warn!(
            "Invalid value {} for {} parameter '{}', using default {}",
            value, model, name, default
        );
        default
    }
}
