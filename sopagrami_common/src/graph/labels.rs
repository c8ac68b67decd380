use ahash::AHashMap;

/// Interned vertex or edge label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelId(pub u32);

impl LabelId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Bidirectional label table. Vertex and edge labels share one id space.
#[derive(Clone, Debug, Default)]
pub struct Labels {
    names: Vec<String>,
    ids: AHashMap<String, LabelId>,
}

impl Labels {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Id for `name`, allocating one on first sight.
    pub fn intern(&mut self, name: &str) -> LabelId {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = LabelId(self.names.len() as u32);
        self.names.push(name.to_owned());
        self.ids.insert(name.to_owned(), id);
        id
    }

    /// Id for `name` if it has been interned.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<LabelId> {
        self.ids.get(name).copied()
    }

    /// Text of an interned label.
    #[must_use]
    pub fn name(&self, id: LabelId) -> &str {
        &self.names[id.index()]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
