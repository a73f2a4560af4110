use vela_value::Value;

use crate::context::ParseContext;
use crate::schema::{Schema, SchemaKind, TypeParser};
use crate::status::{ParseResult, ParseReturn};

/// Parses with `input`, then feeds a valid output into `output`.
///
/// A dirty left side stops the pipeline and keeps its value dirty.
#[derive(Debug, Clone)]
pub struct PipelineSchema {
    input: Schema,
    output: Schema,
}

impl PipelineSchema {
    pub fn new(input: impl Into<Schema>, output: impl Into<Schema>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }

    pub fn input(&self) -> &Schema {
        &self.input
    }

    pub fn output(&self) -> &Schema {
        &self.output
    }
}

impl TypeParser for PipelineSchema {
    fn parse_value(&self, input: Value, ctx: &ParseContext) -> ParseReturn {
        let output = self.output.clone();
        let ctx = ctx.clone();
        self.input
            .parse_input(input, &ctx)
            .and_then(move |result| match result {
                ParseResult::Valid(value) => output.parse_input(value, &ctx),
                other => ParseReturn::Ready(other),
            })
    }
}

impl From<PipelineSchema> for Schema {
    fn from(schema: PipelineSchema) -> Self {
        Schema::new(SchemaKind::Pipeline(schema))
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::issue::IssueCode;
    use crate::{SchemaExt, number, string};

    #[test]
    fn test_pipe_chains_output() {
        let schema = string()
            .transform(|v| Value::from(v.to_js_string().len()))
            .pipe(number().min(2.0));
        assert_eq!(schema.parse("abc").unwrap(), Value::from(3));
        let outcome = schema.safe_parse("a").unwrap();
        assert_eq!(outcome.error().unwrap().issues()[0].code(), IssueCode::TooSmall);
    }

    #[test]
    fn test_dirty_left_stops() {
        let schema = string().min(3).pipe(string().max(1));
        let codes: Vec<IssueCode> = schema
            .safe_parse("ab")
            .unwrap()
            .error()
            .unwrap()
            .issues()
            .iter()
            .map(|issue| issue.code())
            .collect();
        assert_eq!(codes, vec![IssueCode::TooSmall]);
    }

    #[test]
    fn test_async_left_side() {
        let schema = string()
            .transform_async(|v, _| async move { Value::from(v.to_js_string().len()) })
            .pipe(number());
        assert_eq!(block_on(schema.parse_async("abcd")).unwrap(), Value::from(4));
    }
}
