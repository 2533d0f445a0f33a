// Wed Jan 15 2026 - Alex

use super::args::{Args, Command, ConvertArgs, CreateArgs, FindArgs, SourceArgs};
use crate::analysis::{InstructionInfo, InstructionMap, SignatureEncoder};
use crate::config::Config;
use crate::memory::{Address, ByteSource, ImageMemory, MmapMemory};
use crate::pattern::{self, Notation, Pattern, PatternError, PatternScanner, ScanResult, RAW_MARKER};
use crate::ui::progress::ScanProgress;
use crate::ui::{print_info, print_success, print_warning};
use crate::utils::{format_bytes, format_duration, scoped_timer, LoggingUtils};
use anyhow::Context;
use colored::Colorize;
use std::io::{self, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub struct CommandHandler {
    config: Config,
}

impl CommandHandler {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn from_args(args: &Args) -> anyhow::Result<Self> {
        let config = match &args.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("Failed to load settings from {}", path.display()))?,
            None => Config::default(),
        };
        Ok(Self::new(config))
    }

    pub fn execute(&self, args: Args) -> anyhow::Result<()> {
        self.setup_logging(&args);

        match args.command {
            Command::Create(create_args) => self.handle_create(create_args),
            Command::Find(find_args) => self.handle_find(find_args),
            Command::Convert(convert_args) => self.handle_convert(convert_args),
        }
    }

    fn setup_logging(&self, args: &Args) {
        if args.no_color {
            colored::control::set_override(false);
        }
        LoggingUtils::init_logger(LoggingUtils::level_from_str(&args.log_level), !args.no_color);
    }

    fn handle_create(&self, args: CreateArgs) -> anyhow::Result<()> {
        args.validate().map_err(|e| anyhow::anyhow!(e))?;

        let source = open_source(&args.source)?;
        let instructions = match &args.instructions {
            Some(path) => {
                let map = InstructionMap::load(path)
                    .with_context(|| format!("Failed to load instructions from {}", path.display()))?;
                log::debug!("Loaded {} instruction(s)", map.len());
                Some(Arc::new(map) as Arc<dyn InstructionInfo>)
            }
            None => None,
        };

        let notation = args.notation.unwrap_or(self.config.notation);
        let wildcard = self.wildcard_text(args.wildcard.as_deref())?;
        let line = self.create_signature(source, instructions, args.start, args.length, notation, &wildcard)?;

        println!("{}", line);
        Ok(())
    }

    /// Encodes `[start, start + length)` and renders it in `notation`.
    pub fn create_signature(
        &self,
        source: Arc<dyn ByteSource>,
        instructions: Option<Arc<dyn InstructionInfo>>,
        start: Address,
        length: u64,
        notation: Notation,
        wildcard: &str,
    ) -> anyhow::Result<String> {
        let mut encoder = SignatureEncoder::new(source);
        if let Some(info) = instructions {
            encoder = encoder.with_instructions(info);
        }

        let encoded = encoder
            .encode(start, length)
            .with_context(|| format!("Failed to create signature at {}", start))?;
        let text = pattern::render(&encoded.pattern, notation, wildcard);

        if encoded.raw {
            log::warn!("No instruction data at {}, signature has no wildcards", start);
            return Ok(format!("{} {}", text, RAW_MARKER));
        }

        log::info!(
            "{} signature for {} ({} bytes, {} wildcard(s), {} warning(s))",
            notation,
            encoded.range,
            encoded.pattern.len(),
            encoded.pattern.wildcard_byte_count(),
            encoded.warnings.len()
        );
        Ok(text)
    }

    fn handle_find(&self, args: FindArgs) -> anyhow::Result<()> {
        let source = open_source(&args.source)?;
        let text = read_pattern_text(args.pattern)?;
        let notation = args.notation.unwrap_or(self.config.notation);
        let pattern = self.parse_pattern(&text, notation)?;

        let parallel = args.parallel || self.config.parallel;
        if parallel {
            if let Err(e) = rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.threads)
                .build_global()
            {
                log::debug!("Global thread pool already configured: {}", e);
            }
        }

        let cancel = args.timeout.map(|secs| spawn_timeout(Duration::from_secs(secs)));
        let mut progress = ScanProgress::new("Scanning...", !args.no_progress);
        let timer = scoped_timer("signature search");
        let result = self.find_signature(source.as_ref(), &pattern, parallel, cancel, &mut progress);
        let elapsed = timer.elapsed();
        progress.finish();

        if result.cancelled {
            print_warning("Search cancelled before reaching the end of the binary");
        }
        for addr in &result.truncated {
            print_warning(&format!("Region scan stopped at unreadable byte {}", addr));
        }

        if result.is_empty() {
            print_warning(&format!("No matches ({})", format_duration(elapsed)));
            return Ok(());
        }

        print_success(&format!(
            "{} match(es) in {}",
            result.len().to_string().green(),
            format_duration(elapsed)
        ));
        for addr in &result.matches {
            println!("{}", addr);
        }

        if self.config.navigate_to_nearest || args.from.is_some() {
            let reference = args.from.or_else(|| source.start()).unwrap_or_default();
            if let Some(nearest) = result.nearest(reference) {
                print_info(&format!("Nearest match to {}: {}", reference, nearest.to_string().cyan()));
            }
        }

        Ok(())
    }

    /// Scans `source`, logging each match as it is found.
    pub fn find_signature(
        &self,
        source: &dyn ByteSource,
        pattern: &Pattern,
        parallel: bool,
        cancel: Option<Arc<AtomicBool>>,
        progress: &mut ScanProgress,
    ) -> ScanResult {
        let mut scanner = PatternScanner::new()
            .with_chunk_size(self.config.chunk_size)
            .use_parallel(parallel);
        if let Some(flag) = cancel {
            scanner = scanner.with_cancel_flag(flag);
        }

        progress.suspend(|| log::info!("-- SIGSCAN FIND START --"));

        let result = if parallel {
            let result = scanner.scan(source, pattern);
            for &addr in &result.matches {
                progress.record_match(addr);
                progress.suspend(|| log::info!("FOUND SIG AT {}", addr));
            }
            result
        } else {
            let mut matches = scanner.matches(source, pattern);
            let mut found = Vec::new();
            for addr in matches.by_ref() {
                progress.record_match(addr);
                progress.suspend(|| log::info!("FOUND SIG AT {}", addr));
                found.push(addr);
            }
            ScanResult {
                matches: found,
                ..matches.into_result()
            }
        };

        progress.suspend(|| log::info!("-- SIGSCAN FIND END --"));
        result
    }

    fn handle_convert(&self, args: ConvertArgs) -> anyhow::Result<()> {
        let text = read_pattern_text(args.pattern)?;
        let wildcard = self.wildcard_text(args.wildcard.as_deref())?;
        println!("{}", self.convert(&text, args.from, args.to, &wildcard)?);
        Ok(())
    }

    pub fn convert(&self, text: &str, from: Notation, to: Notation, wildcard: &str) -> anyhow::Result<String> {
        let pattern = self.parse_pattern(text, from)?;
        Ok(pattern::render(&pattern, to, wildcard))
    }

    fn parse_pattern(&self, text: &str, notation: Notation) -> anyhow::Result<Pattern> {
        let alias = match notation {
            Notation::Norm => self.config.scan_alias(),
            Notation::Code => None,
        };
        let pattern = pattern::parse(text, notation, alias)
            .with_context(|| format!("Failed to parse {} signature", notation))?;
        log::debug!(
            "Parsed {} token(s), {} significant",
            pattern.len(),
            pattern.significant_byte_count()
        );
        Ok(pattern)
    }

    fn wildcard_text(&self, overridden: Option<&str>) -> anyhow::Result<String> {
        match overridden {
            Some(wildcard) => {
                self.config.clone().with_custom_wildcard(wildcard).validate()?;
                Ok(wildcard.to_string())
            }
            None => Ok(self.config.custom_wildcard.clone()),
        }
    }
}

impl Default for CommandHandler {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

fn open_source(args: &SourceArgs) -> anyhow::Result<Arc<dyn ByteSource>> {
    let path = &args.binary;
    let source: Arc<dyn ByteSource> = if args.raw {
        Arc::new(
            MmapMemory::from_file(path, args.base)
                .with_context(|| format!("Failed to map {}", path.display()))?,
        )
    } else {
        let image = ImageMemory::load(path)
            .with_context(|| format!("Failed to load {} (use --raw for flat files)", path.display()))?;
        log::debug!("Mapped {} segment(s)", image.segments().len());
        Arc::new(image)
    };

    let total: u64 = source.regions().iter().map(|r| r.size()).sum();
    print_info(&format!("Loaded {} ({})", path.display(), format_bytes(total)));
    Ok(source)
}

fn read_pattern_text(pattern: Option<String>) -> anyhow::Result<String> {
    let text = match pattern {
        Some(text) => text,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read signature from stdin")?;
            buf
        }
    };

    if text.trim().is_empty() {
        return Err(PatternError::EmptyInput.into());
    }
    Ok(text)
}

fn spawn_timeout(after: Duration) -> Arc<AtomicBool> {
    let flag = Arc::new(AtomicBool::new(false));
    let timer_flag = Arc::clone(&flag);
    std::thread::spawn(move || {
        std::thread::sleep(after);
        timer_flag.store(true, Ordering::Relaxed);
    });
    flag
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ConstantReference;
    use crate::memory::BufferMemory;
    use std::io::Write;

    const BASE: u64 = 0x401000;

    fn code() -> Vec<u8> {
        vec![
            0x48, 0x8B, 0x05, 0x10, 0x20, 0x30, 0x00, // mov rax, [rip+0x302010]
            0x83, 0xF8, 0x05, // cmp eax, 5
            0xC3, // ret
        ]
    }

    fn instructions() -> Arc<dyn InstructionInfo> {
        Arc::new(
            InstructionMap::new()
                .with(BASE, 7, vec![ConstantReference::pointer(0x703017)])
                .with(BASE + 7, 3, vec![ConstantReference::value(5)])
                .with(BASE + 10, 1, vec![]),
        )
    }

    #[test]
    fn test_create_signature_with_wildcards() {
        let handler = CommandHandler::default();
        let source = Arc::new(BufferMemory::new(Address::new(BASE), code()));

        let norm = handler
            .create_signature(source.clone(), Some(instructions()), Address::new(BASE), 11, Notation::Norm, "?")
            .unwrap();
        assert_eq!(norm, "48 8B 05 ? ? ? ? 83 F8 ? C3");

        let custom = handler
            .create_signature(source, Some(instructions()), Address::new(BASE), 11, Notation::Norm, "??")
            .unwrap();
        assert_eq!(custom, "48 8B 05 ?? ?? ?? ?? 83 F8 ?? C3");
    }

    #[test]
    fn test_create_signature_raw_fallback() {
        let handler = CommandHandler::default();
        let source = Arc::new(BufferMemory::new(Address::new(BASE), code()));

        let line = handler
            .create_signature(source, None, Address::new(BASE + 7), 3, Notation::Norm, "?")
            .unwrap();
        assert_eq!(line, format!("83 F8 05 {}", RAW_MARKER));
    }

    #[test]
    fn test_create_signature_refuses_raw_view() {
        let handler = CommandHandler::default();
        let source = Arc::new(BufferMemory::raw(code()));

        let err = handler
            .create_signature(source, Some(instructions()), Address::zero(), 4, Notation::Norm, "?")
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PatternError>(),
            Some(PatternError::UnsupportedContext(_))
        ));
    }

    #[test]
    fn test_find_signature_in_raw_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0x90, 0x48, 0x8B, 0x05, 0x90, 0x48, 0x8B, 0xFF, 0x90]).unwrap();
        file.flush().unwrap();

        let args = SourceArgs {
            binary: file.path().to_path_buf(),
            raw: true,
            base: Address::new(0x1000),
        };
        let source = open_source(&args).unwrap();

        let handler = CommandHandler::default();
        let pattern = handler.parse_pattern("48 8B ?", Notation::Norm).unwrap();
        let mut progress = ScanProgress::hidden();

        let result = handler.find_signature(source.as_ref(), &pattern, false, None, &mut progress);
        assert_eq!(result.matches, vec![Address::new(0x1001), Address::new(0x1005)]);
        assert_eq!(progress.found(), 2);
        assert_eq!(result.nearest(Address::new(0x1002)), Some(Address::new(0x1005)));

        let parallel = handler.find_signature(source.as_ref(), &pattern, true, None, &mut ScanProgress::hidden());
        assert_eq!(parallel.matches, result.matches);
    }

    #[test]
    fn test_find_signature_cancelled() {
        let handler = CommandHandler::default();
        let source = BufferMemory::new(Address::new(BASE), vec![0x90; 0x4000]);
        let pattern = handler.parse_pattern("90", Notation::Norm).unwrap();
        let flag = Arc::new(AtomicBool::new(true));

        let result = handler.find_signature(&source, &pattern, false, Some(flag), &mut ScanProgress::hidden());
        assert!(result.cancelled);
    }

    #[test]
    fn test_convert_between_notations() {
        let handler = CommandHandler::default();

        let code = handler
            .convert("48 89 ? 9A", Notation::Norm, Notation::Code, "?")
            .unwrap();
        assert_eq!(code, r#""\x48\x89\x00\x9A", "xx?x""#);

        let norm = handler.convert(&code, Notation::Code, Notation::Norm, "??").unwrap();
        assert_eq!(norm, "48 89 ?? 9A");
    }

    #[test]
    fn test_convert_uses_configured_alias() {
        let handler = CommandHandler::new(Config::new().with_custom_wildcard("**"));
        let code = handler
            .convert("48 ** 9A", Notation::Norm, Notation::Code, "**")
            .unwrap();
        assert_eq!(code, r#""\x48\x00\x9A", "x?x""#);

        assert!(handler.convert("48 GQ", Notation::Norm, Notation::Code, "?").is_err());
    }

    #[test]
    fn test_wildcard_override_is_validated() {
        let handler = CommandHandler::default();
        assert_eq!(handler.wildcard_text(None).unwrap(), "?");
        assert_eq!(handler.wildcard_text(Some("??")).unwrap(), "??");
        assert!(handler.wildcard_text(Some("AB")).is_err());
    }
}
