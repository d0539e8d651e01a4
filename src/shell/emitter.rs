/// Hook script generation
///
/// Each dialect gets its own emitter. The output is plain text and depends
/// only on the dialect and the mailbox paths, so rendering twice gives the
/// same bytes.

use crate::core::mailbox::{hint_line, MailboxPaths, Slot};
use crate::error::{AicmdError, Result};
use crate::shell::Shell;
use std::fs;
use std::path::Path;

/// Produces the integration script for one shell dialect
pub trait HookEmitter {
    /// Dialect this emitter targets
    fn shell(&self) -> Shell;

    /// Render the full script
    fn render(&self, paths: &MailboxPaths) -> String;

    /// Render and write the script to `dest`, replacing any previous version
    fn emit_to(&self, paths: &MailboxPaths, dest: &Path) -> Result<()> {
        fs::write(dest, self.render(paths)).map_err(|source| AicmdError::SetupIo {
            path: dest.to_path_buf(),
            source,
        })
    }
}

/// Pick the emitter for a dialect
pub fn emitter_for(shell: Shell) -> Box<dyn HookEmitter> {
    match shell {
        Shell::Bash => Box::new(BashEmitter),
        Shell::Zsh => Box::new(ZshEmitter),
        Shell::Fish => Box::new(FishEmitter),
    }
}

pub struct BashEmitter;
pub struct ZshEmitter;
pub struct FishEmitter;

impl HookEmitter for BashEmitter {
    fn shell(&self) -> Shell {
        Shell::Bash
    }

    fn render(&self, paths: &MailboxPaths) -> String {
        let mut script = header(Shell::Bash);
        script.push_str(&posix_slot_vars(paths));
        script.push_str(&format!(
            "\n__aicmd_hint() {{\n    if [ \"${{AICMD_AUTO_SUGGEST:-}}\" = \"1\" ]; then\n        printf '%s\\n' {} >&2\n    fi\n    return 0\n}}\n",
            sh_quote(hint_line())
        ));
        script.push_str(BASH_BODY);
        script
    }
}

impl HookEmitter for ZshEmitter {
    fn shell(&self) -> Shell {
        Shell::Zsh
    }

    fn render(&self, paths: &MailboxPaths) -> String {
        let mut script = header(Shell::Zsh);
        script.push_str(&posix_slot_vars(paths));
        script.push_str(&format!(
            "\n__aicmd_hint() {{\n    if [[ \"${{AICMD_AUTO_SUGGEST:-}}\" == \"1\" ]]; then\n        print -r -u2 -- {}\n    fi\n    return 0\n}}\n",
            sh_quote(hint_line())
        ));
        script.push_str(ZSH_BODY);
        script
    }
}

impl HookEmitter for FishEmitter {
    fn shell(&self) -> Shell {
        Shell::Fish
    }

    fn render(&self, paths: &MailboxPaths) -> String {
        let mut script = header(Shell::Fish);
        for slot in Slot::ALL {
            script.push_str(&format!(
                "set -g __aicmd_{} {}\n",
                slot.name(),
                fish_quote(&paths.slot_path(slot).to_string_lossy())
            ));
        }
        script.push_str(&format!(
            "\nfunction __aicmd_hint\n    if test \"$AICMD_AUTO_SUGGEST\" = \"1\"\n        printf '%s\\n' {} >&2\n    end\nend\n",
            fish_quote(hint_line())
        ));
        script.push_str(FISH_BODY);
        script
    }
}

fn header(shell: Shell) -> String {
    format!(
        "# aicmd shell integration for {}\n\
         # Generated by `aicmd setup`. Edits are overwritten; rerun setup instead.\n\
         # Failed commands are written to the aicmd mailbox for `aicmd fix`.\n\n",
        shell
    )
}

fn posix_slot_vars(paths: &MailboxPaths) -> String {
    Slot::ALL
        .iter()
        .map(|slot| {
            format!(
                "__aicmd_{}={}\n",
                slot.name(),
                sh_quote(&paths.slot_path(*slot).to_string_lossy())
            )
        })
        .collect()
}

/// Single-quote a string for bash/zsh
fn sh_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// Single-quote a string for fish, where `\'` and `\\` are the only escapes
fn fish_quote(s: &str) -> String {
    format!("'{}'", s.replace('\\', r"\\").replace('\'', r"\'"))
}

const BASH_BODY: &str = r#"
# Mailbox writes never interrupt the shell
__aicmd_write() {
    { printf '%s\n' "$2" >| "$1"; } 2>/dev/null
    return 0
}

command_not_found_handle() {
    local IFS=' '
    __aicmd_write "$__aicmd_last_command" "$*"
    __aicmd_write "$__aicmd_last_error" "bash: $1: command not found"
    __aicmd_write "$__aicmd_last_exit_code" "127"
    __aicmd_write "$__aicmd_simple_error" "Command '$1' not found"
    __aicmd_hint
    printf 'bash: %s: command not found\n' "$1" >&2
    return 127
}

__aicmd_at_prompt=0
__aicmd_command=''

# Armed at the end of every prompt cycle, so only the first command typed
# at the prompt is recorded and prompt hooks never are
__aicmd_preexec() {
    [ "$__aicmd_at_prompt" = "1" ] || return 0
    [ -n "${COMP_LINE:-}" ] && return 0
    # Prompt hooks, ours included, are not commands
    case ";${PROMPT_COMMAND//$'\n'/;};" in
        *";$BASH_COMMAND;"*) return 0 ;;
    esac
    __aicmd_at_prompt=0
    __aicmd_command="${1:-$BASH_COMMAND}"
    __aicmd_write "$__aicmd_current_command" "$__aicmd_command"
}

__aicmd_arm() {
    __aicmd_at_prompt=1
}

__aicmd_postexec() {
    local exit_code=$?
    local cmd="$__aicmd_command"
    __aicmd_command=''
    __aicmd_at_prompt=0
    if [ "$exit_code" -ne 0 ] && [ -n "$cmd" ]; then
        # 127 for a command the not-found handler already captured
        if [ "$exit_code" -eq 127 ] && [ -f "$__aicmd_last_command" ]; then
            local prev
            prev="$(< "$__aicmd_last_command")"
            [ "${prev%% *}" = "${cmd%% *}" ] && return "$exit_code"
        fi
        __aicmd_write "$__aicmd_last_error" "Command '$cmd' failed with exit code $exit_code"
        __aicmd_write "$__aicmd_last_command" "$cmd"
        __aicmd_write "$__aicmd_last_exit_code" "$exit_code"
        __aicmd_hint
    fi
    return "$exit_code"
}

# Runs first to see the command's status, arms last
__aicmd_install_prompt_command() {
    local existing="${PROMPT_COMMAND:-}"
    case ";$existing;" in
        *";__aicmd_postexec;"*) return 0 ;;
    esac
    while :; do
        case "$existing" in
            *';'|*' '|*$'\t'|*$'\n') existing="${existing%?}" ;;
            *) break ;;
        esac
    done
    PROMPT_COMMAND="__aicmd_postexec${existing:+;$existing};__aicmd_arm"
}

# Play along with bash-preexec when it owns the DEBUG trap
if [ -n "${bash_preexec_imported:-}" ]; then
    preexec_functions+=(__aicmd_preexec)
    precmd_functions=(__aicmd_postexec "${precmd_functions[@]}" __aicmd_arm)
else
    # A DEBUG trap the user already had keeps running, before ours.
    # Read at top level: functions do not see the DEBUG trap.
    __aicmd_trap="$(trap -p DEBUG)"
    __aicmd_trap="${__aicmd_trap#trap -- }"
    __aicmd_trap="${__aicmd_trap% DEBUG}"
    eval "__aicmd_trap=${__aicmd_trap:-''}"
    case "$__aicmd_trap" in
        *__aicmd_preexec*) ;;
        '') trap '__aicmd_preexec' DEBUG ;;
        *)
            __aicmd_prior_debug_trap="$__aicmd_trap"
            trap 'eval "$__aicmd_prior_debug_trap"; __aicmd_preexec' DEBUG
            ;;
    esac
    unset __aicmd_trap
    __aicmd_install_prompt_command
fi

aicmd_status() {
    if [ -s "$__aicmd_last_error" ]; then
        cat "$__aicmd_last_error"
    else
        echo "No recent errors"
    fi
}

alias aicmd_on='export AICMD_AUTO_SUGGEST=1'
alias aicmd_off='unset AICMD_AUTO_SUGGEST'
"#;

const ZSH_BODY: &str = r#"
# Mailbox writes never interrupt the shell
__aicmd_write() {
    { print -r -- "$2" >| "$1"; } 2>/dev/null
    return 0
}

command_not_found_handler() {
    local IFS=' '
    __aicmd_write "$__aicmd_last_command" "$*"
    __aicmd_write "$__aicmd_last_error" "zsh: command not found: $1"
    __aicmd_write "$__aicmd_last_exit_code" "127"
    __aicmd_write "$__aicmd_simple_error" "Command '$1' not found"
    __aicmd_hint
    print -r -u2 -- "zsh: command not found: $1"
    return 127
}

typeset -g __aicmd_command=''

__aicmd_preexec() {
    __aicmd_command="$1"
    __aicmd_write "$__aicmd_current_command" "$1"
}

__aicmd_precmd() {
    local exit_code=$?
    local cmd="$__aicmd_command"
    __aicmd_command=''
    if (( exit_code != 0 )) && [[ -n "$cmd" ]]; then
        # 127 for a command the not-found handler already captured
        if (( exit_code == 127 )) && [[ -f "$__aicmd_last_command" ]]; then
            local prev
            prev="$(<"$__aicmd_last_command")"
            [[ "${prev%% *}" == "${cmd%% *}" ]] && return $exit_code
        fi
        __aicmd_write "$__aicmd_last_error" "Command '$cmd' failed with exit code $exit_code"
        __aicmd_write "$__aicmd_last_command" "$cmd"
        __aicmd_write "$__aicmd_last_exit_code" "$exit_code"
        __aicmd_hint
    fi
    return $exit_code
}

autoload -Uz add-zsh-hook
add-zsh-hook preexec __aicmd_preexec
add-zsh-hook precmd __aicmd_precmd

aicmd_status() {
    if [[ -s "$__aicmd_last_error" ]]; then
        cat "$__aicmd_last_error"
    else
        print "No recent errors"
    fi
}

alias aicmd_on='export AICMD_AUTO_SUGGEST=1'
alias aicmd_off='unset AICMD_AUTO_SUGGEST'
"#;

const FISH_BODY: &str = r#"
# Mailbox writes never interrupt the shell
function __aicmd_write --argument-names target value
    begin
        printf '%s\n' "$value" >$target
    end 2>/dev/null
    return 0
end

function fish_command_not_found
    __aicmd_write $__aicmd_last_command "$argv"
    __aicmd_write $__aicmd_last_error "fish: Unknown command: $argv[1]"
    __aicmd_write $__aicmd_last_exit_code 127
    __aicmd_write $__aicmd_simple_error "Command '$argv[1]' not found"
    __aicmd_hint
    printf 'fish: Unknown command: %s\n' $argv[1] >&2
end

function __aicmd_preexec --on-event fish_preexec
    __aicmd_write $__aicmd_current_command "$argv[1]"
end

function __aicmd_postexec --on-event fish_postexec
    set -l exit_code $status
    set -l cmd "$argv[1]"
    if test $exit_code -ne 0; and test -n "$cmd"
        # 127 for a command the not-found handler already captured
        if test $exit_code -eq 127; and test -f $__aicmd_last_command
            read -l prev <$__aicmd_last_command
            set -l prev_name (string split -m1 ' ' -- "$prev")[1]
            set -l cmd_name (string split -m1 ' ' -- "$cmd")[1]
            if test "$prev_name" = "$cmd_name"
                return
            end
        end
        __aicmd_write $__aicmd_last_error "Command '$cmd' failed with exit code $exit_code"
        __aicmd_write $__aicmd_last_command "$cmd"
        __aicmd_write $__aicmd_last_exit_code $exit_code
        __aicmd_hint
    end
end

function aicmd_status
    if test -s $__aicmd_last_error
        cat $__aicmd_last_error
    else
        echo "No recent errors"
    end
end

function aicmd_on
    set -gx AICMD_AUTO_SUGGEST 1
end

function aicmd_off
    set -eg AICMD_AUTO_SUGGEST
end
"#;
