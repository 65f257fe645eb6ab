// Structural extraction: PDF text layer -> text blocks -> headings -> outline.
//
// Components:
// - Parser: pdfium text-layer extraction with OCR fallback for scanned pages
// - Heading detector: weighted font/layout/numbering heuristics
// - Outline builder: ordering, hierarchy repair, quality metrics
// - Text helpers: cleanup and font-name normalization

pub mod builder;
pub mod headings;
pub mod ocr;
pub mod parser;
pub mod text;

// Re-export key types
pub use builder::OutlineBuilder;
pub use headings::HeadingDetector;
pub use ocr::OcrEngine;
pub use parser::PdfParser;
