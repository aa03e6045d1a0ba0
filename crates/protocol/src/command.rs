//! Shell commands used by the execution transport.
//!
//! Both commands are a single line so they fit in one hidden execution unit.
//! The write command embeds the credential text in a double-quoted `printf`
//! format string: the shell removes one level of escaping, `printf` removes
//! the other. [`decode_printf_payload`] reverses both and is what a receiver
//! (or a test) uses to recover the original text.

/// Default location of the credential store on the backend.
pub const DEFAULT_CREDENTIAL_PATH: &str = "~/.aws/credentials";

/// Directory holding [`DEFAULT_CREDENTIAL_PATH`].
pub const DEFAULT_CREDENTIAL_DIR: &str = "~/.aws";

/// Substring that captured output must contain to count as credential data.
pub const DEFAULT_MARKER: &str = "aws_access_key";

/// Command printing the credential store.
pub fn read_command(path: &str) -> String {
	format!("cat {path}")
}

/// Command (re)creating the credential store with `text` as its content.
pub fn write_command(dir: &str, path: &str, text: &str) -> String {
	format!("mkdir -p {dir} && printf \"{}\" > {path}", escape_printf_payload(text))
}

/// Escapes `text` for a double-quoted `printf` format argument.
///
/// The result never contains a newline byte.
pub fn escape_printf_payload(text: &str) -> String {
	let mut out = String::with_capacity(text.len() + 8);
	for c in text.chars() {
		match c {
			'\n' => out.push_str("\\n"),
			'\r' => out.push_str("\\r"),
			'\t' => out.push_str("\\t"),
			// shell turns `\\\\` into `\\`, printf turns that into `\`
			'\\' => out.push_str("\\\\\\\\"),
			'"' => out.push_str("\\\""),
			'$' => out.push_str("\\$"),
			'`' => out.push_str("\\`"),
			'%' => out.push_str("%%"),
			c => out.push(c),
		}
	}
	out
}

/// Recovers the text written by `printf "<payload>"` in a POSIX shell.
pub fn decode_printf_payload(payload: &str) -> String {
	printf_unescape(&shell_unquote(payload))
}

/// Double-quote processing: a backslash only escapes `$`, `` ` ``, `"`, `\` and newline.
fn shell_unquote(payload: &str) -> String {
	let mut out = String::with_capacity(payload.len());
	let mut chars = payload.chars().peekable();
	while let Some(c) = chars.next() {
		if c != '\\' {
			out.push(c);
			continue;
		}
		match chars.peek().copied() {
			Some(next @ ('$' | '`' | '"' | '\\')) => {
				out.push(next);
				chars.next();
			}
			Some('\n') => {
				chars.next();
			}
			_ => out.push('\\'),
		}
	}
	out
}

fn printf_unescape(format: &str) -> String {
	let mut out = String::with_capacity(format.len());
	let mut chars = format.chars().peekable();
	while let Some(c) = chars.next() {
		match (c, chars.peek().copied()) {
			('\\', Some('n')) => {
				out.push('\n');
				chars.next();
			}
			('\\', Some('r')) => {
				out.push('\r');
				chars.next();
			}
			('\\', Some('t')) => {
				out.push('\t');
				chars.next();
			}
			('\\', Some('\\')) => {
				out.push('\\');
				chars.next();
			}
			('%', Some('%')) => {
				out.push('%');
				chars.next();
			}
			(c, _) => out.push(c),
		}
	}
	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn read_command_cats_the_store() {
		assert_eq!(read_command(DEFAULT_CREDENTIAL_PATH), "cat ~/.aws/credentials");
	}

	#[test]
	fn write_command_is_single_line() {
		let cmd = write_command(DEFAULT_CREDENTIAL_DIR, DEFAULT_CREDENTIAL_PATH, "[default]\naws_access_key_id=A\naws_secret_access_key=B\n");
		assert!(!cmd.contains('\n'));
		assert_eq!(
			cmd,
			"mkdir -p ~/.aws && printf \"[default]\\naws_access_key_id=A\\naws_secret_access_key=B\\n\" > ~/.aws/credentials"
		);
	}

	#[test]
	fn payload_recovers_original_text() {
		let samples = [
			"",
			"aws_access_key=ABC\nsecret=XYZ",
			"[default]\r\n\ttoken=\"quoted\"\n",
			"cost=100% of $HOME and `whoami`",
			r"back\slash and \n literal",
			"trailing backslash \\",
			"unicode: ключ ✓",
		];
		for text in samples {
			let escaped = escape_printf_payload(text);
			assert!(!escaped.contains('\n'), "escaped payload spans lines: {escaped:?}");
			assert_eq!(decode_printf_payload(&escaped), text, "round trip failed for {text:?}");
		}
	}

	#[test]
	fn shell_metacharacters_are_inert() {
		let escaped = escape_printf_payload("$(rm -rf ~)\"; echo pwned; \"");
		assert_eq!(escaped, "\\$(rm -rf ~)\\\"; echo pwned; \\\"");
	}
}
