//! Campus directory
//!
//! Static named places with coordinates, plus the search/selection state of
//! the map explorer. Rendering is left to the map widget; this module only
//! produces coordinates and zoom levels.

use crate::error::AssistantError;
use crate::models::{CampusPlace, LatLng};
use crate::Result;
use serde::Serialize;
use tracing::{debug, info};

pub const DEFAULT_ZOOM: u8 = 17;
pub const FOCUS_ZOOM: u8 = 18;

/// Campus places; the gate comes first and is where paths start
pub const CAMPUS_PLACES: &[CampusPlace] = &[
    place("gate", "Campus Gate", 28.797629, 77.53698, "Main entrance to the university campus.", "/places/main_gate.jpg"),
    place("atm", "Axis Bank ATM", 28.7968044, 77.5379392, "ATM for cash withdrawals and banking services.", "/places/atm.jpg"),
    place("zoysia_lawn", "Zoysia Lawn", 28.7967601, 77.5381506, "Spacious lawn area for relaxation and events.", "/places/zoysia_lawn.jpg"),
    place("admin", "Admin Block", 28.7966238, 77.5380648, "Administrative offices for student and faculty support.", "/places/admin.jpg"),
    place("stationary", "Stationary", 28.796807729990185, 77.53836186382996, "Stationary shop for books, pens, and other essentials.", "/places/stationary.jpg"),
    place("academic_block", "Academic Block", 28.796330575437615, 77.53815131042977, "Main academic building with classrooms and labs.", "/places/academic_block.jpg"),
    place("basketball_court", "Basketball Court", 28.797125048309947, 77.5390283927739, "Outdoor basketball court for sports activities.", "/places/basketball_court.jpg"),
    place("volleyball_court", "Volleyball Court", 28.79696403876668, 77.53922687623707, "Outdoor volleyball court for sports activities.", "/places/volleyball_court.jpg"),
    place("red_canteen", "Red Canteen", 28.79627886397272, 77.53913165781404, "Popular canteen serving snacks and beverages.", "/places/red_canteen.jpg"),
    place("cricket_ground", "Cricket Ground", 28.796664348805024, 77.54026623223562, "Cricket ground for matches and practice.", "/places/cricket_ground.jpg"),
    place("football_ground", "Football Ground", 28.797556364622015, 77.53942670082552, "Football ground for matches and practice.", "/places/football_ground.jpg"),
    place("hblock", "H Block Hostel", 28.79554667392576, 77.54028232548832, "Hostel accommodation for students.", "/places/hblock.jpg"),
    place("gblock", "G Block", 28.796133131536337, 77.54073293660865, "Hostel accommodation for students.", "/places/gblock.jpg"),
    place("dblock", "D Block", 28.796492761215497, 77.54108967040057, "Hostel accommodation for students.", "/places/gblock.jpg"),
];

const fn place(
    key: &'static str,
    name: &'static str,
    lat: f64,
    lng: f64,
    description: &'static str,
    image: &'static str,
) -> CampusPlace {
    CampusPlace {
        key,
        name,
        coords: LatLng::new(lat, lng),
        description,
        image: Some(image),
    }
}

pub fn gate() -> &'static CampusPlace {
    &CAMPUS_PLACES[0]
}

/// Case-insensitive substring filter over place names, in declaration
/// order. An empty query matches nothing.
pub fn search(query: &str) -> Vec<&'static CampusPlace> {
    if query.is_empty() {
        return Vec::new();
    }

    let needle = query.to_lowercase();
    CAMPUS_PLACES
        .iter()
        .filter(|p| p.name.to_lowercase().contains(&needle))
        .collect()
}

/// Case-insensitive exact name lookup
pub fn find_by_name(name: &str) -> Option<&'static CampusPlace> {
    let name = name.to_lowercase();
    CAMPUS_PLACES
        .iter()
        .find(|p| p.name.to_lowercase() == name)
}

pub fn find_by_key(key: &str) -> Result<&'static CampusPlace> {
    CAMPUS_PLACES
        .iter()
        .find(|p| p.key == key)
        .ok_or_else(|| AssistantError::UnknownLocation(key.to_string()))
}

/// Where the map widget should look
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapFocus {
    pub center: LatLng,
    pub zoom: u8,
}

/// Search box, suggestion dropdown and selected marker of the map page
#[derive(Debug, Clone, Default, Serialize)]
pub struct MapExplorer {
    query: String,
    suggestions: Vec<&'static str>,
    selected: Option<&'static CampusPlace>,
    show_path: bool,
}

impl MapExplorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn suggestions(&self) -> &[&'static str] {
        &self.suggestions
    }

    pub fn selected(&self) -> Option<&'static CampusPlace> {
        self.selected
    }

    pub fn show_path(&self) -> bool {
        self.show_path
    }

    /// Typing in the search box refreshes the dropdown
    pub fn on_input(&mut self, value: &str) {
        self.query = value.to_string();
        self.suggestions = search(value).into_iter().map(|p| p.name).collect();
        debug!(query = %self.query, matches = self.suggestions.len(), "Location suggestions updated");
    }

    /// Select a place by exact name. Unknown names leave the explorer as is.
    pub fn on_search(&mut self, name: &str) -> Option<&'static CampusPlace> {
        let place = find_by_name(name)?;

        info!(key = place.key, name = place.name, "Location selected");
        self.selected = Some(place);
        self.show_path = true;
        self.query = place.name.to_string();
        self.suggestions.clear();
        Some(place)
    }

    /// Straight line from the gate to the selected place
    pub fn path(&self) -> Option<[LatLng; 2]> {
        match self.selected {
            Some(place) if self.show_path => Some([gate().coords, place.coords]),
            _ => None,
        }
    }

    pub fn focus(&self) -> MapFocus {
        match self.selected {
            Some(place) => MapFocus {
                center: place.coords,
                zoom: FOCUS_ZOOM,
            },
            None => MapFocus {
                center: gate().coords,
                zoom: DEFAULT_ZOOM,
            },
        }
    }
}
