//! Semantic token legend and the relative encoding sent to clients.

use lsp_types::{
    SemanticToken, SemanticTokenModifier, SemanticTokenType, SemanticTokens,
    SemanticTokensFullOptions, SemanticTokensLegend, SemanticTokensOptions,
    SemanticTokensServerCapabilities,
};
use sas_lsp_core::TokenKind;

/// Token types we support. The order defines the wire index.
pub const TOKEN_TYPES: &[SemanticTokenType] = &[
    SemanticTokenType::KEYWORD,   // 0
    SemanticTokenType::STRING,    // 1
    SemanticTokenType::NUMBER,    // 2
    SemanticTokenType::COMMENT,   // 3
    SemanticTokenType::MACRO,     // 4: %name
    SemanticTokenType::VARIABLE,  // 5: &name
    SemanticTokenType::OPERATOR,  // 6
    SemanticTokenType::FUNCTION,  // 7: procedure names
    SemanticTokenType::STRUCT,    // 8: data sets
];

/// Token modifiers we support.
pub const TOKEN_MODIFIERS: &[SemanticTokenModifier] = &[
    SemanticTokenModifier::DECLARATION, // bit 0
];

pub fn legend() -> SemanticTokensLegend {
    SemanticTokensLegend {
        token_types: TOKEN_TYPES.to_vec(),
        token_modifiers: TOKEN_MODIFIERS.to_vec(),
    }
}

pub fn capabilities() -> SemanticTokensServerCapabilities {
    SemanticTokensServerCapabilities::SemanticTokensOptions(SemanticTokensOptions {
        legend: legend(),
        full: Some(SemanticTokensFullOptions::Bool(true)),
        range: None,
        work_done_progress_options: Default::default(),
    })
}

fn type_index(kind: TokenKind) -> u32 {
    match kind {
        TokenKind::Keyword => 0,
        TokenKind::String => 1,
        TokenKind::Number => 2,
        TokenKind::Comment => 3,
        TokenKind::Macro => 4,
        TokenKind::Variable => 5,
        TokenKind::Operator => 6,
        TokenKind::Function => 7,
        TokenKind::Struct => 8,
    }
}

/// Delta-encode tokens that are already sorted by position.
pub fn encode(tokens: &[sas_lsp_core::SemanticToken]) -> SemanticTokens {
    let mut data = Vec::with_capacity(tokens.len());
    let mut prev_line = 0;
    let mut prev_start = 0;

    for token in tokens {
        let delta_line = token.line - prev_line;
        let delta_start = if delta_line == 0 {
            token.start - prev_start
        } else {
            token.start
        };

        data.push(SemanticToken {
            delta_line,
            delta_start,
            length: token.length,
            token_type: type_index(token.kind),
            token_modifiers_bitset: u32::from(token.declaration),
        });

        prev_line = token.line;
        prev_start = token.start;
    }

    SemanticTokens {
        result_id: None,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(
        line: u32,
        start: u32,
        length: u32,
        kind: TokenKind,
        declaration: bool,
    ) -> sas_lsp_core::SemanticToken {
        sas_lsp_core::SemanticToken {
            line,
            start,
            length,
            kind,
            declaration,
        }
    }

    #[test]
    fn test_legend_matches_indices() {
        let legend = legend();
        let type_of = |kind| &legend.token_types[type_index(kind) as usize];
        assert_eq!(type_of(TokenKind::Function), &SemanticTokenType::FUNCTION);
        assert_eq!(type_of(TokenKind::Struct), &SemanticTokenType::STRUCT);
        assert_eq!(legend.token_types.len(), 9);
    }

    #[test]
    fn test_relative_encoding() {
        let encoded = encode(&[
            raw(0, 0, 4, TokenKind::Keyword, false),
            raw(0, 5, 1, TokenKind::Struct, true),
            raw(2, 2, 3, TokenKind::Keyword, false),
        ]);

        let flat: Vec<[u32; 5]> = encoded
            .data
            .iter()
            .map(|t| {
                [t.delta_line, t.delta_start, t.length, t.token_type, t.token_modifiers_bitset]
            })
            .collect();
        assert_eq!(flat, vec![[0, 0, 4, 0, 0], [0, 5, 1, 8, 1], [2, 2, 3, 0, 0]]);
    }

    #[test]
    fn test_empty_input() {
        assert!(encode(&[]).data.is_empty());
    }
}
