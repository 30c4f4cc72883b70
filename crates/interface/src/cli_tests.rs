//! CLI Tests

#[cfg(test)]
mod tests {
    use crate::cli::{Cli, CliError, Commands, ConfigCommand, OutputFormat};
    use crate::cli::{describe_config, load_context, render_text};
    use crate::repl::{ReplInput, format_update, parse_input};
    use clap::Parser;
    use fusbuddy_core::{LlmProvider, ProviderPreference, UserConfig};
    use fusbuddy_palette::{LogBody, LogEntry, LogEntryKind, PaletteStatus, PaletteUpdate, UiEvent};
    use std::path::PathBuf;

    /// Test CliError display implementations
    #[test]
    fn test_cli_error_display() {
        let error = CliError::Input {
            path: "notes.md".to_string(),
            reason: "not found".to_string(),
        };
        assert_eq!(format!("{}", error), "Cannot read notes.md: not found");

        let error = CliError::Session("stdin closed".to_string());
        assert_eq!(format!("{}", error), "Session error: stdin closed");
    }

    #[test]
    fn test_parse_render_defaults_to_html() {
        let cli = Cli::try_parse_from(["fusbuddy", "render", "reply.md"]).unwrap();
        assert!(!cli.verbose);
        match cli.command {
            Commands::Render(args) => {
                assert_eq!(args.file, Some(PathBuf::from("reply.md")));
                assert_eq!(args.format, OutputFormat::Html);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "fusbuddy",
            "render",
            "--format",
            "text",
            "--verbose",
            "--config-dir",
            "/tmp/fb",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config_dir, Some(PathBuf::from("/tmp/fb")));
        assert!(matches!(
            cli.command,
            Commands::Render(ref args) if args.format == OutputFormat::Text && args.file.is_none()
        ));
    }

    #[test]
    fn test_parse_chat_flags() {
        let cli =
            Cli::try_parse_from(["fusbuddy", "chat", "--context", "ctx.json", "--html"]).unwrap();
        match cli.command {
            Commands::Chat(args) => {
                assert_eq!(args.context, Some(PathBuf::from("ctx.json")));
                assert!(args.html);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_config_set_key() {
        let cli = Cli::try_parse_from([
            "fusbuddy",
            "config",
            "set-key",
            "--provider",
            "openai",
            "sk-test-key-123456",
        ])
        .unwrap();
        match cli.command {
            Commands::Config(ConfigCommand::SetKey { provider, key }) => {
                assert_eq!(provider, LlmProvider::OpenAi);
                assert_eq!(key, "sk-test-key-123456");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_config_set_key_rejects_unknown_provider() {
        let result = Cli::try_parse_from([
            "fusbuddy",
            "config",
            "set-key",
            "--provider",
            "claude",
            "k",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_render_text_plain() {
        let out = render_text("# Plan\n1. Select **edge**\n2. Apply", OutputFormat::Text);
        assert_eq!(out, "# Plan\n\n[ ] Select edge\n[ ] Apply");
    }

    #[test]
    fn test_render_text_html_escapes() {
        let out = render_text("<script>", OutputFormat::Html);
        assert_eq!(out, "<p>&lt;script&gt;</p>");
    }

    #[test]
    fn test_load_context_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ctx.json");
        std::fs::write(&path, r#"{"document": {"name": "Bracket"}}"#).unwrap();

        let ctx = load_context(&path).unwrap();
        assert_eq!(ctx.document_name(), Some("Bracket"));
    }

    #[test]
    fn test_load_context_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ctx.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = load_context(&path).unwrap_err();
        assert!(matches!(err, CliError::InvalidContext { .. }));
    }

    #[test]
    fn test_describe_config_masks_keys() {
        let mut cfg = UserConfig::default();
        cfg.set_api_key(LlmProvider::OpenAi, "sk-abcdefghijklmnop");
        cfg.llm_provider = ProviderPreference::Auto;

        let text = describe_config(&cfg, &PathBuf::from("/tmp/fb/config.json"));
        assert!(text.contains("Provider preference: auto"));
        assert!(text.contains("openai key: sk-abcd...mnop"));
        assert!(text.contains("gemini key: (not set)"));
        assert!(!text.contains("sk-abcdefghijklmnop"));
    }

    #[test]
    fn test_parse_input_submit_keeps_text() {
        assert_eq!(
            parse_input("How do I shell a body?"),
            ReplInput::Event(UiEvent::Submit("How do I shell a body?".to_string()))
        );
    }

    #[test]
    fn test_parse_input_commands() {
        assert_eq!(parse_input("/quit"), ReplInput::Quit);
        assert_eq!(parse_input(" /help "), ReplInput::Help);
        assert_eq!(
            parse_input("/key gemini AIzaKey123"),
            ReplInput::Event(UiEvent::SaveApiKey {
                api_key: "AIzaKey123".to_string(),
                provider: LlmProvider::Gemini,
            })
        );
        assert!(matches!(parse_input("/key"), ReplInput::Invalid(_)));
        assert!(matches!(parse_input("/key claude x"), ReplInput::Invalid(_)));
        assert!(matches!(parse_input("/frobnicate"), ReplInput::Invalid(_)));
    }

    #[test]
    fn test_format_update() {
        let entry = LogEntry::new(LogEntryKind::User, LogBody::Text("hi".to_string()));
        let update = PaletteUpdate::EntryAppended(entry.clone());
        assert_eq!(format_update(&update, false), Some(entry.to_plain()));
        assert_eq!(format_update(&update, true), Some(entry.to_html()));

        let error = PaletteUpdate::StatusChanged(PaletteStatus::Error("offline".to_string()));
        assert_eq!(
            format_update(&error, false),
            Some("[Error: offline]".to_string())
        );
        assert_eq!(
            format_update(&PaletteUpdate::StatusChanged(PaletteStatus::Ready), false),
            None
        );
        assert_eq!(format_update(&PaletteUpdate::SendEnabled(true), false), None);
    }

    #[test]
    fn test_key_save_feedback_is_printed() {
        // `/key gemini` with no key still reaches the controller, which rejects it
        assert_eq!(
            parse_input("/key gemini"),
            ReplInput::Event(UiEvent::SaveApiKey {
                api_key: String::new(),
                provider: LlmProvider::Gemini,
            })
        );

        let rejected = PaletteUpdate::StatusChanged(PaletteStatus::Rejected(
            "Please enter an API key".to_string(),
        ));
        assert_eq!(
            format_update(&rejected, false),
            Some("[Please enter an API key]".to_string())
        );

        let saved = PaletteUpdate::StatusChanged(PaletteStatus::ApiKeySaved(LlmProvider::Gemini));
        assert_eq!(
            format_update(&saved, false),
            Some("[API key saved (gemini)]".to_string())
        );
        assert_eq!(
            format_update(&PaletteUpdate::StatusChanged(PaletteStatus::Sending), false),
            None
        );
    }
}
