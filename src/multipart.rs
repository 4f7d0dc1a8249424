// multipart/form-data encoder. Parts are written in insertion order, each
// framed by a boundary that is generated fresh for every encoded body.

use uuid::Uuid;

/// Content type used when nothing better is known about a file.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// One named entry of a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        filename: String,
        mime: String,
        bytes: Vec<u8>,
    },
}

impl Part {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Part::Text {
            name: name.into(),
            value: value.into(),
        }
    }

    /// File part; an empty `mime` falls back to `application/octet-stream`.
    pub fn file(
        name: impl Into<String>,
        bytes: Vec<u8>,
        mime: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        let mime = mime.into();
        Part::File {
            name: name.into(),
            filename: filename.into(),
            mime: if mime.trim().is_empty() {
                OCTET_STREAM.to_string()
            } else {
                mime
            },
            bytes,
        }
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        match self {
            Part::Text { name, value } => {
                out.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n", name).as_bytes(),
                );
                out.extend_from_slice(b"Content-Type: text/plain; charset=UTF-8\r\n\r\n");
                out.extend_from_slice(value.as_bytes());
            }
            Part::File {
                name,
                filename,
                mime,
                bytes,
            } => {
                out.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                        name, filename
                    )
                    .as_bytes(),
                );
                out.extend_from_slice(format!("Content-Type: {}\r\n\r\n", mime).as_bytes());
                out.extend_from_slice(bytes);
            }
        }
    }
}

/// Ordered list of parts waiting to be encoded.
#[derive(Debug, Default, Clone)]
pub struct MultipartForm {
    parts: Vec<Part>,
}

/// An encoded body together with the boundary that frames it.
#[derive(Debug, Clone)]
pub struct MultipartBody {
    pub boundary: String,
    pub bytes: Vec<u8>,
}

impl MultipartBody {
    /// Value for the request's `Content-Type` header.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }
}

impl MultipartForm {
    pub fn new() -> Self {
        MultipartForm::default()
    }

    pub fn part(mut self, part: Part) -> Self {
        self.parts.push(part);
        self
    }

    pub fn text(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.part(Part::text(name, value))
    }

    /// Encode with a fresh random boundary.
    pub fn encode(&self) -> MultipartBody {
        self.encode_with_boundary(Uuid::new_v4().simple().to_string())
    }

    fn encode_with_boundary(&self, boundary: String) -> MultipartBody {
        let mut bytes = Vec::new();
        for part in &self.parts {
            bytes.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
            part.write_to(&mut bytes);
            bytes.extend_from_slice(b"\r\n");
        }
        bytes.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());
        MultipartBody { boundary, bytes }
    }
}
