use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{DynProvider, Provider};
use alloy::rpc::types::{Filter, Log, TransactionRequest};
use alloy::sol;
use alloy::sol_types::SolEvent;
use alloy::transports::RpcError;

use crate::amount::TokenAmount;
use crate::auth::TransactionAuthorization;
use crate::error::{Result, TokenError};
use crate::session::Session;

// The fixed ERC20 deployed by this tool: "Token" / "TOK", 18 decimals, with
// 100 * 10^18 base units minted to the deployer by the constructor.
sol! {
	#[sol(rpc, bytecode = "0x60806040523480156200001157600080fd5b506040518060400160405280600581526020017f546f6b656e0000000000000000000000000000000000000000000000000000008152506040518060400160405280600381526020017f544f4b000000000000000000000000000000000000000000000000000000000081525081600390805190602001906200009692919062000281565b508060049080519060200190620000af92919062000281565b505050620000ef33620000c7620000f560201b60201c565b600a620000d5919062000471565b6064620000e39190620005ae565b620000fe60201b60201c565b620006f0565b60006012905090565b600073ffffffffffffffffffffffffffffffffffffffff168273ffffffffffffffffffffffffffffffffffffffff16141562000171576040517f08c379a0000000000000000000000000000000000000000000000000000000008152600401620001689062000369565b60405180910390fd5b62000185600083836200027760201b60201c565b8060026000828254620001999190620003b9565b92505081905550806000808473ffffffffffffffffffffffffffffffffffffffff1673ffffffffffffffffffffffffffffffffffffffff1681526020019081526020016000206000828254620001f09190620003b9565b925050819055508173ffffffffffffffffffffffffffffffffffffffff16600073ffffffffffffffffffffffffffffffffffffffff167fddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef836040516200025791906200038b565b60405180910390a362000273600083836200027c60201b60201c565b5050565b505050565b505050565b8280546200028f9062000626565b90600052602060002090601f016020900481019282620002b35760008555620002ff565b82601f10620002ce57805160ff1916838001178555620002ff565b82800160010185558215620002ff579182015b82811115620002fe578251825591602001919060010190620002e1565b5b5090506200030e919062000312565b5090565b5b808211156200032d57600081600090555060010162000313565b5090565b600062000340601f83620003a8565b91506200034d82620006c7565b602082019050919050565b62000363816200060f565b82525050565b60006020820190508181036000830152620003848162000331565b9050919050565b6000602082019050620003a2600083018462000358565b92915050565b600082825260208201905092915050565b6000620003c6826200060f565b9150620003d3836200060f565b9250827fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff038211156200040b576200040a6200065c565b5b828201905092915050565b6000808291508390505b6001851115620004685780860481111562000440576200043f6200065c565b5b6001851615620004505780820291505b80810290506200046085620006ba565b945062000420565b94509492505050565b60006200047e826200060f565b91506200048b8362000619565b9250620004ba7fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff8484620004c2565b905092915050565b600082620004d45760019050620005a7565b81620004e45760009050620005a7565b8160018114620004fd576002811462000508576200053e565b6001915050620005a7565b60ff8411156200051d576200051c6200065c565b5b8360020a9150848211156200053757620005366200065c565b5b50620005a7565b5060208310610133831016604e8410600b8410161715620005785782820a9050838111156200057257620005716200065c565b5b620005a7565b62000587848484600162000416565b92509050818404811115620005a157620005a06200065c565b5b81810290505b9392505050565b6000620005bb826200060f565b9150620005c8836200060f565b9250817fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff04831182151516156200060457620006036200065c565b5b828202905092915050565b6000819050919050565b600060ff82169050919050565b600060028204905060018216806200063f57607f821691505b602082108114156200065657620006556200068b565b5b50919050565b7f4e487b7100000000000000000000000000000000000000000000000000000000600052601160045260246000fd5b7f4e487b7100000000000000000000000000000000000000000000000000000000600052602260045260246000fd5b60008160011c9050919050565b7f45524332303a206d696e7420746f20746865207a65726f206164647265737300600082015250565b61126880620007006000396000f3fe608060405234801561001057600080fd5b50600436106100a95760003560e01c80633950935111610071578063395093511461016857806370a082311461019857806395d89b41146101c8578063a457c2d7146101e6578063a9059cbb14610216578063dd62ed3e14610246576100a9565b806306fdde03146100ae578063095ea7b3146100cc57806318160ddd146100fc57806323b872dd1461011a578063313ce5671461014a575b600080fd5b6100b6610276565b6040516100c39190610d29565b60405180910390f35b6100e660048036038101906100e19190610b73565b610308565b6040516100f39190610d0e565b60405180910390f35b61010461032b565b6040516101119190610e2b565b60405180910390f35b610134600480360381019061012f9190610b20565b610335565b6040516101419190610d0e565b60405180910390f35b610152610364565b60405161015f9190610e46565b60405180910390f35b610182600480360381019061017d9190610b73565b61036d565b60405161018f9190610d0e565b60405180910390f35b6101b260048036038101906101ad9190610ab3565b6103a4565b6040516101bf9190610e2b565b60405180910390f35b6101d06103ec565b6040516101dd9190610d29565b60405180910390f35b61020060048036038101906101fb9190610b73565b61047e565b60405161020d9190610d0e565b60405180910390f35b610230600480360381019061022b9190610b73565b6104f5565b60405161023d9190610d0e565b60405180910390f35b610260600480360381019061025b9190610ae0565b610518565b60405161026d9190610e2b565b60405180910390f35b60606003805461028590610f5b565b80601f01602080910402602001604051908101604052809291908181526020018280546102b190610f5b565b80156102fe5780601f106102d3576101008083540402835291602001916102fe565b820191906000526020600020905b8154815290600101906020018083116102e157829003601f168201915b5050505050905090565b60008061031361059f565b90506103208185856105a7565b600191505092915050565b6000600254905090565b60008061034061059f565b905061034d858285610772565b6103588585856107fe565b60019150509392505050565b60006012905090565b60008061037861059f565b905061039981858561038a8589610518565b6103949190610e7d565b6105a7565b600191505092915050565b60008060008373ffffffffffffffffffffffffffffffffffffffff1673ffffffffffffffffffffffffffffffffffffffff168152602001908152602001600020549050919050565b6060600480546103fb90610f5b565b80601f016020809104026020016040519081016040528092919081815260200182805461042790610f5b565b80156104745780601f1061044957610100808354040283529160200191610474565b820191906000526020600020905b81548152906001019060200180831161045757829003601f168201915b5050505050905090565b60008061048961059f565b905060006104978286610518565b9050838110156104dc576040517f08c379a00000000000000000000000000000000000000000000000000000000081526004016104d390610e0b565b60405180910390fd5b6104e982868684036105a7565b60019250505092915050565b60008061050061059f565b905061050d8185856107fe565b600191505092915050565b6000600160008473ffffffffffffffffffffffffffffffffffffffff1673ffffffffffffffffffffffffffffffffffffffff16815260200190815260200160002060008373ffffffffffffffffffffffffffffffffffffffff1673ffffffffffffffffffffffffffffffffffffffff16815260200190815260200160002054905092915050565b600033905090565b600073ffffffffffffffffffffffffffffffffffffffff168373ffffffffffffffffffffffffffffffffffffffff161415610617576040517f08c379a000000000000000000000000000000000000000000000000000000000815260040161060e90610deb565b60405180910390fd5b600073ffffffffffffffffffffffffffffffffffffffff168273ffffffffffffffffffffffffffffffffffffffff161415610687576040517f08c379a000000000000000000000000000000000000000000000000000000000815260040161067e90610d6b565b60405180910390fd5b80600160008573ffffffffffffffffffffffffffffffffffffffff1673ffffffffffffffffffffffffffffffffffffffff16815260200190815260200160002060008473ffffffffffffffffffffffffffffffffffffffff1673ffffffffffffffffffffffffffffffffffffffff168152602001908152602001600020819055508173ffffffffffffffffffffffffffffffffffffffff168373ffffffffffffffffffffffffffffffffffffffff167f8c5be1e5ebec7d5bd14f71427d1e84f3dd0314c0f7b2291e5b200ac8c7c3b925836040516107659190610e2b565b60405180910390a3505050565b600061077e8484610518565b90507fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff81146107f857818110156107ea576040517f08c379a00000000000000000000000000000000000000000000000000000000081526004016107e190610d8b565b60405180910390fd5b6107f784848484036105a7565b5b50505050565b600073ffffffffffffffffffffffffffffffffffffffff168373ffffffffffffffffffffffffffffffffffffffff16141561086e576040517f08c379a000000000000000000000000000000000000000000000000000000000815260040161086590610dcb565b60405180910390fd5b600073ffffffffffffffffffffffffffffffffffffffff168273ffffffffffffffffffffffffffffffffffffffff1614156108de576040517f08c379a00000000000000000000000000000000000000000000000000000000081526004016108d590610d4b565b60405180910390fd5b6108e9838383610a7f565b60008060008573ffffffffffffffffffffffffffffffffffffffff1673ffffffffffffffffffffffffffffffffffffffff1681526020019081526020016000205490508181101561096f576040517f08c379a000000000000000000000000000000000000000000000000000000000815260040161096690610dab565b60405180910390fd5b8181036000808673ffffffffffffffffffffffffffffffffffffffff1673ffffffffffffffffffffffffffffffffffffffff16815260200190815260200160002081905550816000808573ffffffffffffffffffffffffffffffffffffffff1673ffffffffffffffffffffffffffffffffffffffff1681526020019081526020016000206000828254610a029190610e7d565b925050819055508273ffffffffffffffffffffffffffffffffffffffff168473ffffffffffffffffffffffffffffffffffffffff167fddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef84604051610a669190610e2b565b60405180910390a3610a79848484610a84565b50505050565b505050565b505050565b600081359050610a9881611204565b92915050565b600081359050610aad8161121b565b92915050565b600060208284031215610ac957610ac8610feb565b5b6000610ad784828501610a89565b91505092915050565b60008060408385031215610af757610af6610feb565b5b6000610b0585828601610a89565b9250506020610b1685828601610a89565b9150509250929050565b600080600060608486031215610b3957610b38610feb565b5b6000610b4786828701610a89565b9350506020610b5886828701610a89565b9250506040610b6986828701610a9e565b9150509250925092565b60008060408385031215610b8a57610b89610feb565b5b6000610b9885828601610a89565b9250506020610ba985828601610a9e565b9150509250929050565b610bbc81610ee5565b82525050565b6000610bcd82610e61565b610bd78185610e6c565b9350610be7818560208601610f28565b610bf081610ff0565b840191505092915050565b6000610c08602383610e6c565b9150610c1382611001565b604082019050919050565b6000610c2b602283610e6c565b9150610c3682611050565b604082019050919050565b6000610c4e601d83610e6c565b9150610c598261109f565b602082019050919050565b6000610c71602683610e6c565b9150610c7c826110c8565b604082019050919050565b6000610c94602583610e6c565b9150610c9f82611117565b604082019050919050565b6000610cb7602483610e6c565b9150610cc282611166565b604082019050919050565b6000610cda602583610e6c565b9150610ce5826111b5565b604082019050919050565b610cf981610f11565b82525050565b610d0881610f1b565b82525050565b6000602082019050610d236000830184610bb3565b92915050565b60006020820190508181036000830152610d438184610bc2565b905092915050565b60006020820190508181036000830152610d6481610bfb565b9050919050565b60006020820190508181036000830152610d8481610c1e565b9050919050565b60006020820190508181036000830152610da481610c41565b9050919050565b60006020820190508181036000830152610dc481610c64565b9050919050565b60006020820190508181036000830152610de481610c87565b9050919050565b60006020820190508181036000830152610e0481610caa565b9050919050565b60006020820190508181036000830152610e2481610ccd565b9050919050565b6000602082019050610e406000830184610cf0565b92915050565b6000602082019050610e5b6000830184610cff565b92915050565b600081519050919050565b600082825260208201905092915050565b6000610e8882610f11565b9150610e9383610f11565b9250827fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff03821115610ec857610ec7610f8d565b5b828201905092915050565b6000610ede82610ef1565b9050919050565b60008115159050919050565b600073ffffffffffffffffffffffffffffffffffffffff82169050919050565b6000819050919050565b600060ff82169050919050565b60005b83811015610f46578082015181840152602081019050610f2b565b83811115610f55576000848401525b50505050565b60006002820490506001821680610f7357607f821691505b60208210811415610f8757610f86610fbc565b5b50919050565b7f4e487b7100000000000000000000000000000000000000000000000000000000600052601160045260246000fd5b7f4e487b7100000000000000000000000000000000000000000000000000000000600052602260045260246000fd5b600080fd5b6000601f19601f8301169050919050565b7f45524332303a207472616e7366657220746f20746865207a65726f206164647260008201527f6573730000000000000000000000000000000000000000000000000000000000602082015250565b7f45524332303a20617070726f766520746f20746865207a65726f20616464726560008201527f7373000000000000000000000000000000000000000000000000000000000000602082015250565b7f45524332303a20696e73756666696369656e7420616c6c6f77616e6365000000600082015250565b7f45524332303a207472616e7366657220616d6f756e742065786365656473206260008201527f616c616e63650000000000000000000000000000000000000000000000000000602082015250565b7f45524332303a207472616e736665722066726f6d20746865207a65726f20616460008201527f6472657373000000000000000000000000000000000000000000000000000000602082015250565b7f45524332303a20617070726f76652066726f6d20746865207a65726f2061646460008201527f7265737300000000000000000000000000000000000000000000000000000000602082015250565b7f45524332303a2064656372656173656420616c6c6f77616e63652062656c6f7760008201527f207a65726f000000000000000000000000000000000000000000000000000000602082015250565b61120d81610ed3565b811461121857600080fd5b50565b61122481610f11565b811461122f57600080fd5b5056fea2646970667358221220fae032a04fee5bb118da74f0aef836759c674fbca3eacbd1e45878299fc845bb64736f6c63430008060033")]
	contract Token {
		event Approval(address indexed owner, address indexed spender, uint256 value);
		event Transfer(address indexed from, address indexed to, uint256 value);

		constructor();

		function name() external view returns (string memory);
		function symbol() external view returns (string memory);
		function decimals() external view returns (uint8);
		function totalSupply() external view returns (uint256);
		function balanceOf(address account) external view returns (uint256);
		function allowance(address owner, address spender) external view returns (uint256);

		function transfer(address to, uint256 amount) external returns (bool);
		function transferFrom(address from, address to, uint256 amount) external returns (bool);
		function approve(address spender, uint256 amount) external returns (bool);
		function increaseAllowance(address spender, uint256 addedValue) external returns (bool);
		function decreaseAllowance(address spender, uint256 subtractedValue) external returns (bool);
	}
}

/// Outcome of a deployment transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
	pub address: Address,
	pub deployer: Address,
	pub tx_hash: TxHash,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMetadata {
	pub name: String,
	pub symbol: String,
	pub decimals: u8,
}

/// Single entry point to a deployed token: read-only calls, state-changing
/// transactions and the event log.
#[derive(Clone)]
pub struct TokenContract {
	session: Session,
	instance: Token::TokenInstance<DynProvider>,
}

impl TokenContract {
	/// Bind to a token already deployed at `address`.
	pub fn at(session: &Session, address: Address) -> Self {
		Self {
			session: session.clone(),
			instance: Token::new(address, session.provider().clone()),
		}
	}

	/// Sign and broadcast the creation transaction.  The contract address is
	/// derived from the sender and nonce, so it is known before inclusion.
	pub async fn deploy(
		session: &Session,
		auth: TransactionAuthorization,
	) -> Result<(Self, Deployment)> {
		let deployer = auth.sender();
		let address = deployer.create(auth.nonce());

		let request = Token::deploy_builder(session.provider().clone()).into_transaction_request();
		let envelope = auth.sign(request).await?;
		let tx_hash = session.send(envelope).await?;

		tracing::info!(%address, %deployer, %tx_hash, "token deployment submitted");
		let deployment = Deployment {
			address,
			deployer,
			tx_hash,
		};
		Ok((Self::at(session, address), deployment))
	}

	pub fn address(&self) -> Address {
		*self.instance.address()
	}

	// -- Calls --

	pub async fn name(&self) -> Result<String> {
		Ok(self.instance.name().call().await?)
	}

	pub async fn symbol(&self) -> Result<String> {
		Ok(self.instance.symbol().call().await?)
	}

	pub async fn decimals(&self) -> Result<u8> {
		Ok(self.instance.decimals().call().await?)
	}

	pub async fn total_supply(&self) -> Result<U256> {
		Ok(self.instance.totalSupply().call().await?)
	}

	pub async fn balance_of(&self, account: Address) -> Result<U256> {
		Ok(self.instance.balanceOf(account).call().await?)
	}

	pub async fn allowance(&self, owner: Address, spender: Address) -> Result<U256> {
		Ok(self.instance.allowance(owner, spender).call().await?)
	}

	pub async fn metadata(&self) -> Result<TokenMetadata> {
		Ok(TokenMetadata {
			name: self.name().await?,
			symbol: self.symbol().await?,
			decimals: self.decimals().await?,
		})
	}

	/// Balance of `account` paired with the token's decimals.
	pub async fn balance_amount(&self, account: Address, decimals: u8) -> Result<TokenAmount> {
		Ok(TokenAmount::new(self.balance_of(account).await?, decimals))
	}

	// -- Transactions --
	//
	// Each one is dry-run with eth_call from the authorized sender first; a
	// revert is reported without broadcasting anything.

	pub async fn transfer(
		&self,
		auth: TransactionAuthorization,
		to: Address,
		amount: U256,
	) -> Result<TxHash> {
		let call = self.instance.transfer(to, amount).from(auth.sender());
		simulated("transfer", call.call().await)?;
		self.submit(auth, call.into_transaction_request()).await
	}

	pub async fn transfer_from(
		&self,
		auth: TransactionAuthorization,
		from: Address,
		to: Address,
		amount: U256,
	) -> Result<TxHash> {
		let call = self.instance.transferFrom(from, to, amount).from(auth.sender());
		simulated("transferFrom", call.call().await)?;
		self.submit(auth, call.into_transaction_request()).await
	}

	pub async fn approve(
		&self,
		auth: TransactionAuthorization,
		spender: Address,
		amount: U256,
	) -> Result<TxHash> {
		let call = self.instance.approve(spender, amount).from(auth.sender());
		simulated("approve", call.call().await)?;
		self.submit(auth, call.into_transaction_request()).await
	}

	pub async fn increase_allowance(
		&self,
		auth: TransactionAuthorization,
		spender: Address,
		added: U256,
	) -> Result<TxHash> {
		let call = self.instance.increaseAllowance(spender, added).from(auth.sender());
		simulated("increaseAllowance", call.call().await)?;
		self.submit(auth, call.into_transaction_request()).await
	}

	pub async fn decrease_allowance(
		&self,
		auth: TransactionAuthorization,
		spender: Address,
		subtracted: U256,
	) -> Result<TxHash> {
		let call = self.instance.decreaseAllowance(spender, subtracted).from(auth.sender());
		simulated("decreaseAllowance", call.call().await)?;
		self.submit(auth, call.into_transaction_request()).await
	}

	async fn submit(
		&self,
		auth: TransactionAuthorization,
		request: TransactionRequest,
	) -> Result<TxHash> {
		let envelope = auth.sign(request).await?;
		self.session.send(envelope).await
	}

	// -- Events --

	/// A cursor over this token's Transfer/Approval events starting at `block`.
	pub fn events_from(&self, block: u64) -> EventCursor {
		EventCursor {
			session: self.session.clone(),
			address: self.address(),
			next_block: block,
			last_head: None,
		}
	}
}

impl std::fmt::Debug for TokenContract {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TokenContract")
			.field("address", &self.address())
			.finish()
	}
}

/// Map the dry-run result of a state-changing call.  Node-side rejections
/// (reverts) become `ContractCall`; transport failures stay `Rpc`.
fn simulated(method: &str, outcome: std::result::Result<bool, alloy::contract::Error>) -> Result<()> {
	match outcome {
		Ok(true) => Ok(()),
		Ok(false) => Err(TokenError::ContractCall(format!("{method} returned false"))),
		Err(alloy::contract::Error::TransportError(RpcError::ErrorResp(payload))) => Err(
			TokenError::ContractCall(format!("{method} would revert: {}", payload.message)),
		),
		Err(e) => Err(e.into()),
	}
}

// -- Events --

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenEventKind {
	Transfer {
		from: Address,
		to: Address,
		value: U256,
	},
	Approval {
		owner: Address,
		spender: Address,
		value: U256,
	},
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenEvent {
	pub block_number: Option<u64>,
	pub tx_hash: Option<TxHash>,
	pub kind: TokenEventKind,
}

impl TokenEvent {
	/// Decode a raw log, returning `None` for topics this token never emits.
	pub fn decode(log: &Log) -> Result<Option<Self>> {
		let Some(topic0) = log.topics().first() else {
			return Ok(None);
		};

		let kind = if *topic0 == Token::Transfer::SIGNATURE_HASH {
			let ev = log.log_decode::<Token::Transfer>().map_err(decode_error)?;
			let ev = &ev.inner.data;
			TokenEventKind::Transfer {
				from: ev.from,
				to: ev.to,
				value: ev.value,
			}
		} else if *topic0 == Token::Approval::SIGNATURE_HASH {
			let ev = log.log_decode::<Token::Approval>().map_err(decode_error)?;
			let ev = &ev.inner.data;
			TokenEventKind::Approval {
				owner: ev.owner,
				spender: ev.spender,
				value: ev.value,
			}
		} else {
			return Ok(None);
		};

		Ok(Some(Self {
			block_number: log.block_number,
			tx_hash: log.transaction_hash,
			kind,
		}))
	}
}

fn decode_error(e: alloy::sol_types::Error) -> TokenError {
	TokenError::ContractCall(format!("undecodable event log: {e}"))
}

/// Lazy, restartable walk over a token's event log.
///
/// Nothing is fetched until `next_batch` is called.  Each batch covers the
/// blocks between the cursor and the chain head at the time of the call, and
/// moves the cursor past them, so repeated calls only ever return new events.
#[derive(Debug, Clone)]
pub struct EventCursor {
	session: Session,
	address: Address,
	next_block: u64,
	last_head: Option<u64>,
}

impl EventCursor {
	/// First block the next batch will include.
	pub fn position(&self) -> u64 {
		self.next_block
	}

	/// Chain head seen by the most recent `next_batch`, if any.
	pub fn last_head(&self) -> Option<u64> {
		self.last_head
	}

	/// Rewind or fast-forward to `block`.
	pub fn restart(&mut self, block: u64) {
		self.next_block = block;
	}

	pub async fn next_batch(&mut self) -> Result<Vec<TokenEvent>> {
		let head = self.session.block_number().await?;
		self.last_head = Some(head);
		if self.next_block > head {
			return Ok(Vec::new());
		}

		let filter = Filter::new()
			.address(self.address)
			.from_block(self.next_block)
			.to_block(head);
		let logs = self.session.provider().get_logs(&filter).await?;
		tracing::debug!(from = self.next_block, to = head, logs = logs.len(), "eth_getLogs");

		let mut events = Vec::with_capacity(logs.len());
		for log in &logs {
			if let Some(event) = TokenEvent::decode(log)? {
				events.push(event);
			}
		}

		self.next_block = head + 1;
		Ok(events)
	}
}
