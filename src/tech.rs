//! Technology profiles.
//!
//! A profile describes, per fabrication process, which layer bounds each
//! project and which layers are suppressed in preview renders. Profiles live
//! in a registry keyed by technology id so adding a process is additive; the
//! shuttle-id prefix shortcut below is the only non-registry lookup.

/// Per-technology rendering profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TechnologyProfile {
    /// Technology identifier, also names the `lyp/{id}.lyp` style sheet.
    pub id: &'static str,
    /// Normalized name of the layer whose bbox crops each project render.
    pub boundary_layer: &'static str,
    /// Normalized layer names suppressed during rendering.
    pub hidden_layers: &'static [&'static str],
}

/// All known technologies.
static PROFILES: &[TechnologyProfile] = &[
    TechnologyProfile {
        id: "sky130A",
        boundary_layer: "prBoundary.boundary",
        hidden_layers: &["areaid.standardc", "areaid.lowTapDensity"],
    },
    TechnologyProfile {
        id: "sg13g2",
        boundary_layer: "235/4",
        hidden_layers: &["235/4"],
    },
];

impl TechnologyProfile {
    /// Look up a profile by technology id.
    pub fn by_id(id: &str) -> Option<&'static TechnologyProfile> {
        PROFILES.iter().find(|p| p.id == id)
    }

    /// Select the profile for a shuttle id.
    ///
    /// Naming-convention shortcut: `ttihp*` shuttles are IHP sg13g2, anything
    /// else defaults to sky130A. Unrecognized prefixes deliberately fall
    /// through to sky130A rather than failing.
    pub fn for_shuttle(shuttle_id: &str) -> &'static TechnologyProfile {
        let id = if shuttle_id.starts_with("ttihp") {
            "sg13g2"
        } else {
            "sky130A"
        };
        TechnologyProfile::by_id(id).unwrap_or(&PROFILES[0])
    }

    /// Derive the display name the visibility rules match against.
    ///
    /// sky130A style sheets name layers `li1.drawing - 67/20`; only the part
    /// before the dash identifies the layer. Fill-pattern layers carry no
    /// name at all and derive to the empty string.
    pub fn normalize_layer_name(&self, raw: &str) -> String {
        match self.id {
            "sky130A" => raw.split('-').next().unwrap_or("").trim().to_string(),
            _ => raw.trim().to_string(),
        }
    }
}
