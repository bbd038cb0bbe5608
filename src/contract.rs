//! Solidity contract templates.
//!
//! Pure text substitution: a contract kind, a token name and a token
//! symbol go in, compilable-looking source comes out. The symbol doubles
//! as the contract identifier, so it is reduced to ASCII alphanumerics.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const DEFAULT_NAME: &str = "MyToken";
const DEFAULT_SYMBOL: &str = "MTK";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    #[error("unknown contract kind {0:?}, expected ERC-721, ERC-20, ERC-1155 or Custom")]
    UnknownKind(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContractKind {
    Erc721,
    Erc20,
    Erc1155,
    Custom,
}

impl ContractKind {
    pub const ALL: [ContractKind; 4] = [
        ContractKind::Erc721,
        ContractKind::Erc20,
        ContractKind::Erc1155,
        ContractKind::Custom,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ContractKind::Erc721 => "ERC-721 (NFT)",
            ContractKind::Erc20 => "ERC-20 (Token)",
            ContractKind::Erc1155 => "ERC-1155 (Multi-Token)",
            ContractKind::Custom => "Custom",
        }
    }
}

impl fmt::Display for ContractKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ContractKind {
    type Err = ContractError;

    /// Accepts the full labels (`"ERC-721 (NFT)"`) as well as short
    /// forms such as `erc721`, `ERC-20` or `custom`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .split('(')
            .next()
            .unwrap_or_default()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        match key.as_str() {
            "erc721" => Ok(ContractKind::Erc721),
            "erc20" => Ok(ContractKind::Erc20),
            "erc1155" => Ok(ContractKind::Erc1155),
            "custom" => Ok(ContractKind::Custom),
            _ => Err(ContractError::UnknownKind(s.to_string())),
        }
    }
}

/// Strip everything but ASCII letters and digits.
pub fn sanitize_symbol(symbol: &str) -> String {
    symbol.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

/// Render the source for `kind`.
///
/// An empty name or symbol falls back to `MyToken`/`MTK`. The symbol is
/// sanitized after the fallback, so a symbol made only of punctuation
/// yields an empty identifier, exactly as typed.
pub fn template(kind: ContractKind, name: &str, symbol: &str) -> String {
    let name = if name.trim().is_empty() {
        DEFAULT_NAME
    } else {
        name
    };
    let symbol = if symbol.trim().is_empty() {
        DEFAULT_SYMBOL
    } else {
        symbol
    };
    let symbol = sanitize_symbol(symbol);

    match kind {
        ContractKind::Erc721 => erc721(name, &symbol),
        ContractKind::Erc20 => erc20(name, &symbol),
        ContractKind::Erc1155 => erc1155(name, &symbol),
        ContractKind::Custom => custom(name, &symbol),
    }
}

fn erc721(name: &str, symbol: &str) -> String {
    format!(
        r#"// SPDX-License-Identifier: MIT
pragma solidity ^0.8.0;

import "@openzeppelin/contracts/token/ERC721/ERC721.sol";
import "@openzeppelin/contracts/access/Ownable.sol";
import "@openzeppelin/contracts/utils/Counters.sol";

contract {symbol} is ERC721, Ownable {{
    using Counters for Counters.Counter;
    Counters.Counter private _tokenIds;

    constructor() ERC721("{name}", "{symbol}") {{}}

    function mintNFT(address recipient)
        public onlyOwner
        returns (uint256)
    {{
        _tokenIds.increment();
        uint256 newItemId = _tokenIds.current();
        _mint(recipient, newItemId);
        return newItemId;
    }}

    function totalSupply() public view returns (uint256) {{
        return _tokenIds.current();
    }}
}}"#
    )
}

fn erc20(name: &str, symbol: &str) -> String {
    format!(
        r#"// SPDX-License-Identifier: MIT
pragma solidity ^0.8.0;

import "@openzeppelin/contracts/token/ERC20/ERC20.sol";
import "@openzeppelin/contracts/access/Ownable.sol";

contract {symbol} is ERC20, Ownable {{
    constructor(uint256 initialSupply) ERC20("{name}", "{symbol}") {{
        _mint(msg.sender, initialSupply * 10 ** decimals());
    }}

    function mint(address to, uint256 amount) public onlyOwner {{
        _mint(to, amount);
    }}

    function burn(uint256 amount) public {{
        _burn(msg.sender, amount);
    }}
}}"#
    )
}

fn erc1155(name: &str, symbol: &str) -> String {
    let host = name.to_lowercase();
    format!(
        r#"// SPDX-License-Identifier: MIT
pragma solidity ^0.8.0;

import "@openzeppelin/contracts/token/ERC1155/ERC1155.sol";
import "@openzeppelin/contracts/access/Ownable.sol";

contract {symbol} is ERC1155, Ownable {{
    string public name;
    string public symbol;

    constructor() ERC1155("https://api.{host}.com/metadata/{{id}}") {{
        name = "{name}";
        symbol = "{symbol}";
    }}

    function mint(
        address to,
        uint256 id,
        uint256 amount,
        bytes memory data
    ) public onlyOwner {{
        _mint(to, id, amount, data);
    }}

    function mintBatch(
        address to,
        uint256[] memory ids,
        uint256[] memory amounts,
        bytes memory data
    ) public onlyOwner {{
        _mintBatch(to, ids, amounts, data);
    }}
}}"#
    )
}

fn custom(name: &str, symbol: &str) -> String {
    format!(
        r#"// SPDX-License-Identifier: MIT
pragma solidity ^0.8.0;

import "@openzeppelin/contracts/access/Ownable.sol";

contract {symbol} is Ownable {{
    string public name;
    string public symbol;

    // State variables
    mapping(address => uint256) public balances;

    // Events
    event CustomEvent(address indexed user, uint256 amount);

    constructor() {{
        name = "{name}";
        symbol = "{symbol}";
    }}

    // Add your custom functions here
    function customFunction() public {{
        // Your logic here
    }}
}}"#
    )
}
