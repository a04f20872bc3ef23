use anyhow::{Result, anyhow};
use swc_common::{BytePos, FileName, GLOBALS, Globals, SourceMap, Span, sync::Lrc};
use swc_ecma_ast::Module;
use swc_ecma_parser::{Parser, StringInput, Syntax, TsSyntax};

/// A parsed TypeScript file together with the text it was parsed from.
pub struct ParsedSource {
    pub module: Module,
    pub code: String,
    /// Start position of the file in its source map; subtract from a span
    /// position to get a byte offset into `code`.
    pub base: BytePos,
}

impl ParsedSource {
    /// Byte range of `span` within `code`.
    pub fn range(&self, span: Span) -> (usize, usize) {
        let lo = (span.lo.0 - self.base.0) as usize;
        let hi = (span.hi.0 - self.base.0) as usize;
        (lo.min(self.code.len()), hi.min(self.code.len()))
    }

    /// Source text covered by `span`.
    pub fn snippet(&self, span: Span) -> &str {
        let (lo, hi) = self.range(span);
        self.code.get(lo..hi).unwrap_or_default()
    }
}

/// Parse TypeScript source code (decorators enabled) into an AST.
///
/// Each call uses its own source map and swc globals so files can be parsed
/// in parallel.
pub fn parse_ts_source(code: String, file_path: &str) -> Result<ParsedSource> {
    GLOBALS.set(&Globals::new(), || {
        let source_map: Lrc<SourceMap> = Default::default();
        let source_file =
            source_map.new_source_file(FileName::Real(file_path.into()).into(), code.clone());

        let syntax = Syntax::Typescript(TsSyntax {
            decorators: true,
            ..Default::default()
        });
        let mut parser = Parser::new(syntax, StringInput::from(&*source_file), None);

        let module = parser
            .parse_module()
            .map_err(|e| anyhow!("Failed to parse {}: {:?}", file_path, e.kind()))?;

        Ok(ParsedSource {
            module,
            code,
            base: source_file.start_pos,
        })
    })
}
