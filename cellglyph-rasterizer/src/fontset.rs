use fontdb::{Database, Family, Query, Stretch, Style, Weight};

use crate::error::Error;
use crate::face::Face;

/// Thin wrapper over a `fontdb` database: resolves a family name and style
/// to a concrete `(path, face index)` pair and opens it as a [`Face`].
///
/// This is the piece that stands in for a system font provider; callers
/// needing a fallback-font lookup by Unicode coverage (the external
/// fallback-font provider from the font selector's contract) query this
/// database by codepoint instead of by name.
pub struct FontSet {
    db: Database,
}

impl Default for FontSet {
    fn default() -> Self {
        let mut db = Database::new();
        db.load_system_fonts();
        Self { db }
    }
}

impl FontSet {
    /// Builds a font set with no fonts loaded; useful for tests that only
    /// care about explicit [`FontSet::load_file`] calls.
    #[must_use]
    pub fn empty() -> Self {
        Self { db: Database::new() }
    }

    /// Registers every font found in `path` (a file or directory).
    pub fn load_file(&mut self, path: &str) {
        self.db.load_fonts_dir(path);
    }

    /// Opens the best match for `family` at the given weight/style.
    pub fn open(&self, family: &str, bold: bool, italic: bool) -> Result<Face, Error> {
        let query = Query {
            families: &[Family::Name(family)],
            weight: if bold { Weight::BOLD } else { Weight::NORMAL },
            stretch: Stretch::Normal,
            style: if italic { Style::Italic } else { Style::Normal },
        };
        let id = self
            .db
            .query(&query)
            .ok_or_else(|| Error::face_open_failed(family, 0, "no matching system font"))?;
        self.open_by_id(id)
    }

    /// Finds the first loaded face (in database order) that covers `cp`,
    /// preferring a bold/italic style match. Used for last-resort fallback
    /// when the caller has no opinion on family name.
    pub fn find_covering(&self, cp: u32, bold: bool, italic: bool) -> Option<fontdb::ID> {
        let style_matches = |face: &fontdb::FaceInfo| {
            (face.style == Style::Italic) == italic && (face.weight.0 >= Weight::BOLD.0) == bold
        };
        self.db
            .faces()
            .filter(|face| style_matches(face))
            .find(|face| self.face_covers(face.id, cp))
            .map(|face| face.id)
    }

    fn face_covers(&self, id: fontdb::ID, cp: u32) -> bool {
        self.open_by_id(id).map(|face| face.has_codepoint(cp)).unwrap_or(false)
    }

    /// Opens a face by its `fontdb` identity.
    pub fn open_by_id(&self, id: fontdb::ID) -> Result<Face, Error> {
        let loaded = self.db.with_face_data(id, |data, index| (data.to_vec(), index));
        let Some((data, index)) = loaded else {
            return Err(Error::face_open_failed("<unknown>", 0, "face id not found in database"));
        };
        let path = match self.db.face_source(id) {
            Some((fontdb::Source::File(p), _)) => p.display().to_string(),
            _ => "<embedded>".to_string(),
        };
        Face::from_bytes(data, index, path)
    }
}
