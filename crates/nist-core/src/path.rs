/// A path into the hierarchy. Each axis is `None` ("Undefined" in spec
/// §4.6) to mean "stop here, address this level" rather than "address
/// everything" — see [`crate::model::File::resolve`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexPath {
    pub record: Option<usize>,
    pub field_id: Option<u16>,
    pub subfield: Option<usize>,
    pub item: Option<usize>,
}

impl IndexPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(mut self, index: usize) -> Self {
        self.record = Some(index);
        self
    }

    pub fn field(mut self, field_id: u16) -> Self {
        self.field_id = Some(field_id);
        self
    }

    pub fn subfield(mut self, index: usize) -> Self {
        self.subfield = Some(index);
        self
    }

    pub fn item(mut self, index: usize) -> Self {
        self.item = Some(index);
        self
    }
}
