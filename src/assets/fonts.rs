use std::{collections::HashMap, path::Path, sync::Arc};

use usvg::fontdb;

use crate::foundation::error::{OgError, OgResult};

/// Families tried, in order, when resolving a sans-serif face.
const SANS_FALLBACKS: &[&str] = &[
    "Helvetica Neue",
    "Helvetica",
    "Arial",
    "DejaVu Sans",
    "Liberation Sans",
    "Noto Sans",
    "Open Sans",
    "Roboto",
];

/// Font weight for a text line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextWeight {
    /// 400.
    Regular,
    /// 500.
    Medium,
    /// 600.
    Semibold,
    /// 700.
    Bold,
}

impl TextWeight {
    /// CSS numeric weight.
    pub fn css(self) -> u16 {
        match self {
            Self::Regular => 400,
            Self::Medium => 500,
            Self::Semibold => 600,
            Self::Bold => 700,
        }
    }
}

/// One resolved font face with its backing bytes.
#[derive(Clone)]
pub struct FontFace {
    /// Primary family name reported by the font.
    pub family: String,
    /// PostScript name; unique per face.
    pub post_script_name: Arc<str>,
    /// Face index inside a collection file.
    pub index: u32,
    /// Actual weight of the face.
    pub weight: u16,
    /// Raw font file bytes.
    pub data: Arc<Vec<u8>>,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("family", &self.family)
            .field("post_script_name", &self.post_script_name)
            .field("index", &self.index)
            .field("weight", &self.weight)
            .field("data_len", &self.data.len())
            .finish()
    }
}

/// Font database plus a per-weight cache of resolved faces.
pub struct FontBook {
    db: fontdb::Database,
    resolved: HashMap<TextWeight, Option<FontFace>>,
}

impl FontBook {
    /// Book backed by the fonts installed on this machine.
    #[tracing::instrument]
    pub fn system() -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        tracing::debug!(faces = db.len(), "loaded system fonts");
        Self::from_db(db)
    }

    /// Book with no faces; every text line is skipped.
    pub fn empty() -> Self {
        Self::from_db(fontdb::Database::new())
    }

    /// Book backed by a single font file.
    pub fn from_file(path: &Path) -> OgResult<Self> {
        let data = std::fs::read(path)
            .map_err(|e| OgError::asset(format!("read font '{}': {e}", path.display())))?;
        let mut db = fontdb::Database::new();
        db.load_font_data(data);
        if db.is_empty() {
            return Err(OgError::asset(format!(
                "no font faces in '{}'",
                path.display()
            )));
        }
        Ok(Self::from_db(db))
    }

    fn from_db(db: fontdb::Database) -> Self {
        Self {
            db,
            resolved: HashMap::new(),
        }
    }

    /// Number of faces known to the book.
    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    /// Resolve the closest sans-serif face for `weight`, or `None` when no face is available.
    pub fn face(&mut self, weight: TextWeight) -> Option<FontFace> {
        if let Some(cached) = self.resolved.get(&weight) {
            return cached.clone();
        }
        let face = self.resolve(weight);
        match &face {
            Some(f) => tracing::debug!(
                ?weight,
                family = %f.family,
                face = %f.post_script_name,
                "resolved font"
            ),
            None => tracing::warn!(?weight, "no font face available"),
        }
        self.resolved.insert(weight, face.clone());
        face
    }

    fn resolve(&self, weight: TextWeight) -> Option<FontFace> {
        let mut families = vec![fontdb::Family::SansSerif];
        families.extend(SANS_FALLBACKS.iter().map(|name| fontdb::Family::Name(*name)));
        let query = fontdb::Query {
            families: &families,
            weight: fontdb::Weight(weight.css()),
            stretch: fontdb::Stretch::Normal,
            style: fontdb::Style::Normal,
        };

        let id = self.db.query(&query).or_else(|| self.any_face(weight))?;
        self.load(id)
    }

    /// Deterministic last resort: the upright face closest to `weight`, ties broken by name.
    fn any_face(&self, weight: TextWeight) -> Option<fontdb::ID> {
        let target = i32::from(weight.css());
        self.db
            .faces()
            .filter(|f| f.style == fontdb::Style::Normal)
            .min_by(|a, b| {
                let dist_a = (i32::from(a.weight.0) - target).abs();
                let dist_b = (i32::from(b.weight.0) - target).abs();
                dist_a
                    .cmp(&dist_b)
                    .then_with(|| a.post_script_name.cmp(&b.post_script_name))
            })
            .map(|f| f.id)
    }

    fn load(&self, id: fontdb::ID) -> Option<FontFace> {
        let info = self.db.face(id)?;
        let family = info
            .families
            .first()
            .map(|(name, _)| name.clone())
            .unwrap_or_else(|| info.post_script_name.clone());
        let post_script_name: Arc<str> = Arc::from(info.post_script_name.as_str());
        let weight = info.weight.0;
        let (data, index) = self
            .db
            .with_face_data(id, |bytes, index| (bytes.to_vec(), index))?;
        Some(FontFace {
            family,
            post_script_name,
            index,
            weight,
            data: Arc::new(data),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fonts.rs"]
mod tests;
