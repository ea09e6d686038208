use bytes::Bytes;

/// A single upload as received from the client. Lives for one request.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub name: String,
    pub content: Bytes,
    /// Content type reported by the client; empty when it sent none.
    pub declared_type: String,
}

impl UploadedDocument {
    pub fn new(name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            declared_type: String::new(),
        }
    }

    pub fn with_declared_type(mut self, declared_type: impl Into<String>) -> Self {
        self.declared_type = declared_type.into();
        self
    }

    pub fn size(&self) -> usize {
        self.content.len()
    }
}
