use crate::utils::{BundlerError, Result};
use oxc_allocator::Allocator;
use oxc_codegen::{Codegen, CodegenOptions};
use oxc_parser::Parser;
use oxc_semantic::SemanticBuilder;
use oxc_span::SourceType;

/// Pretty-prints bundle text with oxc
#[derive(Debug, Clone, Default)]
pub struct JsFormatter;

impl JsFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Re-parse `source` as a classic script and print it back with the
    /// default layout. Fails if the text does not parse or breaks an early
    /// error rule, such as module syntax or a duplicate declaration.
    pub fn format(&self, source: &str) -> Result<String> {
        let allocator = Allocator::default();
        let source_type = SourceType::default().with_script(true);

        let parse_result = Parser::new(&allocator, source, source_type).parse();

        if !parse_result.errors.is_empty() {
            let errors: Vec<String> = parse_result
                .errors
                .iter()
                .map(|e| format!("Parse error: {}", e))
                .collect();
            return Err(BundlerError::Format(errors.join("\n")));
        }

        let semantic_ret = SemanticBuilder::new()
            .with_check_syntax_error(true)
            .build(&parse_result.program);

        if !semantic_ret.errors.is_empty() {
            let errors: Vec<String> = semantic_ret
                .errors
                .iter()
                .map(|e| format!("Syntax error: {}", e))
                .collect();
            return Err(BundlerError::Format(errors.join("\n")));
        }

        let codegen_options = CodegenOptions {
            minify: false,
            ..Default::default()
        };

        Ok(Codegen::new()
            .with_options(codegen_options)
            .build(&parse_result.program)
            .code)
    }
}
